use std::sync::Arc;

use crate::error::Result;
use crate::llm::prompts::{
    daily_insight_format_prompt, daily_insight_reasoning_prompt, INSIGHT_FORMATTER_SYSTEM_PROMPT,
};
use crate::llm::{GenerationOptions, GenerativeModel};
use crate::models::{DiaryInput, UserContext};

use super::parser::{parse_structured, request_structured};
use super::types::{DailyInsight, PipelineStage};

/// Daily report pipeline. Errors propagate like the quest pipeline.
#[derive(Clone)]
pub struct DailyInsightAnalyzer {
    reasoner: Arc<dyn GenerativeModel>,
    formatter: Arc<dyn GenerativeModel>,
}

impl DailyInsightAnalyzer {
    pub fn new(reasoner: Arc<dyn GenerativeModel>, formatter: Arc<dyn GenerativeModel>) -> Self {
        Self {
            reasoner,
            formatter,
        }
    }

    pub async fn analyze(&self, ctx: &UserContext, diary: &DiaryInput) -> Result<DailyInsight> {
        let mut stage = PipelineStage::Start;
        self.run(ctx, diary, &mut stage).await.map_err(|error| {
            tracing::error!(stage = %stage, error = %error, "Daily insight pipeline failed");
            error
        })
    }

    async fn run(
        &self,
        ctx: &UserContext,
        diary: &DiaryInput,
        stage: &mut PipelineStage,
    ) -> Result<DailyInsight> {
        let prompt = daily_insight_reasoning_prompt(ctx, diary)?;
        *stage = PipelineStage::PromptBuilt;

        let analysis = self
            .reasoner
            .complete(&prompt, None, &GenerationOptions::reasoning())
            .await?;
        *stage = PipelineStage::ProviderACalled;

        let raw = request_structured::<DailyInsight>(
            self.formatter.as_ref(),
            &daily_insight_format_prompt(&analysis),
            Some(INSIGHT_FORMATTER_SYSTEM_PROMPT),
            &GenerationOptions::formatting(),
        )
        .await?;
        *stage = PipelineStage::ProviderBCalled;

        let insight: DailyInsight = parse_structured(raw)?;

        let insight = DailyInsight {
            summary: insight.summary.trim().to_string(),
            patterns: non_empty(insight.patterns),
            insights: non_empty(insight.insights),
            suggestions: non_empty(insight.suggestions),
        };
        *stage = PipelineStage::ResultReady;

        Ok(insight)
    }
}

fn non_empty(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
