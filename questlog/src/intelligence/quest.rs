use std::sync::Arc;

use crate::error::Result;
use crate::llm::prompts::{quest_format_prompt, quest_reasoning_prompt, QUEST_FORMATTER_SYSTEM_PROMPT};
use crate::llm::{GenerationOptions, GenerativeModel};
use crate::models::{QuestCountPolicy, UserContext};

use super::parser::{parse_structured, request_structured, validate_quests};
use super::types::{PipelineStage, QuestsResult};

/// Quest pipeline: the reasoner drafts a plan, the formatter turns it into
/// quest records. Every failure propagates to the caller.
#[derive(Clone)]
pub struct QuestOrchestrator {
    reasoner: Arc<dyn GenerativeModel>,
    formatter: Arc<dyn GenerativeModel>,
}

impl QuestOrchestrator {
    pub fn new(reasoner: Arc<dyn GenerativeModel>, formatter: Arc<dyn GenerativeModel>) -> Self {
        Self {
            reasoner,
            formatter,
        }
    }

    pub async fn generate_quests(
        &self,
        ctx: &UserContext,
        policy: QuestCountPolicy,
    ) -> Result<QuestsResult> {
        let mut stage = PipelineStage::Start;
        self.run(ctx, policy, &mut stage).await.map_err(|error| {
            tracing::error!(
                stage = %stage,
                error = %error,
                reasoner = self.reasoner.model_name(),
                formatter = self.formatter.model_name(),
                "Quest pipeline failed"
            );
            error
        })
    }

    async fn run(
        &self,
        ctx: &UserContext,
        policy: QuestCountPolicy,
        stage: &mut PipelineStage,
    ) -> Result<QuestsResult> {
        let prompt = quest_reasoning_prompt(ctx, policy)?;
        *stage = PipelineStage::PromptBuilt;

        let rationale = self
            .reasoner
            .complete(&prompt, None, &GenerationOptions::reasoning())
            .await?;
        *stage = PipelineStage::ProviderACalled;

        let format_prompt = quest_format_prompt(&rationale, policy);
        let raw = request_structured::<QuestsResult>(
            self.formatter.as_ref(),
            &format_prompt,
            Some(QUEST_FORMATTER_SYSTEM_PROMPT),
            &GenerationOptions::formatting(),
        )
        .await?;
        *stage = PipelineStage::ProviderBCalled;

        let quests = validate_quests(parse_structured(raw)?, policy)?;
        *stage = PipelineStage::ResultReady;

        tracing::info!(quests = quests.quests.len(), "Quests generated");
        Ok(quests)
    }
}
