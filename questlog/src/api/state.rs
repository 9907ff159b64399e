use std::sync::Arc;

use crate::config::Config;
use crate::intelligence::{DailyInsightAnalyzer, QuestOrchestrator, ReflectionOrchestrator};
use crate::llm::LlmProvider;
use crate::services::{
    CharacterService, DiaryService, QuestRefreshManager, QuestService, Workspaces,
};
use crate::store::{AdminStore, WorkspaceConnector};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// First pipeline stage: free-text reasoning.
    pub reasoner: LlmProvider,
    /// Second pipeline stage: schema-constrained formatting.
    pub formatter: LlmProvider,
    pub workspaces: Workspaces,
    pub characters: CharacterService,
    pub quests: QuestService,
    pub diary: DiaryService,
}

impl AppState {
    pub fn new(
        config: Config,
        admin: Arc<dyn AdminStore>,
        connector: Arc<dyn WorkspaceConnector>,
        reasoner: LlmProvider,
        formatter: LlmProvider,
    ) -> Self {
        let workspaces = Workspaces::new(admin, connector);
        let reasoner_model = Arc::new(reasoner.clone());
        let formatter_model = Arc::new(formatter.clone());

        let quests = QuestService::new(
            workspaces.clone(),
            QuestOrchestrator::new(reasoner_model.clone(), formatter_model.clone()),
            config.quests.count_policy,
        );
        let diary = DiaryService::new(
            workspaces.clone(),
            ReflectionOrchestrator::new(reasoner_model.clone(), formatter_model.clone()),
            DailyInsightAnalyzer::new(reasoner_model, formatter_model),
        );
        let characters = CharacterService::new(workspaces.clone());

        Self {
            config: Arc::new(config),
            reasoner,
            formatter,
            workspaces,
            characters,
            quests,
            diary,
        }
    }

    /// Background quest top-up sharing this state's services.
    pub fn quest_refresh(&self) -> QuestRefreshManager {
        QuestRefreshManager::new(
            self.workspaces.clone(),
            self.quests.clone(),
            self.config.quests.min_active_quests,
            self.config.quests.check_interval_secs,
        )
    }
}
