use std::sync::Arc;

use crate::error::Result;
use crate::llm::prompts::{
    reflection_analysis_prompt, reflection_refine_prompt, REFLECTION_FORMATTER_SYSTEM_PROMPT,
};
use crate::llm::{GenerationOptions, GenerativeModel};
use crate::models::{DiaryInput, UserContext};

use super::parser::{
    fallback_questions, parse_analysis, parse_structured, request_structured, validate_questions,
};
use super::types::{ParsedAnalysis, PipelineStage, QuestionsResult};

/// Two-stage reflection pipeline: the reasoner analyses the diary and drafts
/// questions, the formatter condenses them into exactly five.
#[derive(Clone)]
pub struct ReflectionOrchestrator {
    reasoner: Arc<dyn GenerativeModel>,
    formatter: Arc<dyn GenerativeModel>,
}

impl ReflectionOrchestrator {
    pub fn new(reasoner: Arc<dyn GenerativeModel>, formatter: Arc<dyn GenerativeModel>) -> Self {
        Self {
            reasoner,
            formatter,
        }
    }

    /// Produce five reflection questions for the diary.
    ///
    /// Never fails: an error at any stage is logged and replaced by the fixed
    /// fallback questions.
    pub async fn generate_questions(&self, ctx: &UserContext, diary: &DiaryInput) -> QuestionsResult {
        let mut stage = PipelineStage::Start;
        match self.run(ctx, diary, &mut stage).await {
            Ok(result) => result,
            Err(error) => {
                tracing::error!(
                    stage = %stage,
                    error = %error,
                    reasoner = self.reasoner.model_name(),
                    formatter = self.formatter.model_name(),
                    "Reflection pipeline failed, using fallback questions"
                );
                fallback_questions()
            }
        }
    }

    /// First stage only: reasoner call plus loose parsing.
    async fn analyze(
        &self,
        ctx: &UserContext,
        diary: &DiaryInput,
        stage: &mut PipelineStage,
    ) -> Result<ParsedAnalysis> {
        let prompt = reflection_analysis_prompt(ctx, diary)?;
        *stage = PipelineStage::PromptBuilt;

        let raw = self
            .reasoner
            .complete(&prompt, None, &GenerationOptions::reasoning())
            .await?;
        *stage = PipelineStage::ProviderACalled;

        Ok(parse_analysis(&raw))
    }

    async fn run(
        &self,
        ctx: &UserContext,
        diary: &DiaryInput,
        stage: &mut PipelineStage,
    ) -> Result<QuestionsResult> {
        let parsed = self.analyze(ctx, diary, stage).await?;
        tracing::debug!(
            analysis_len = parsed.result.analysis.len(),
            draft_questions = parsed.result.questions.len(),
            degraded = parsed.is_degraded(),
            "Reflection analysis parsed"
        );

        let refine_prompt = reflection_refine_prompt(&parsed.result);
        let raw = request_structured::<QuestionsResult>(
            self.formatter.as_ref(),
            &refine_prompt,
            Some(REFLECTION_FORMATTER_SYSTEM_PROMPT),
            &GenerationOptions::formatting(),
        )
        .await?;
        *stage = PipelineStage::ProviderBCalled;

        let result = validate_questions(parse_structured(raw)?)?;
        *stage = PipelineStage::ResultReady;

        tracing::info!(questions = result.questions.len(), "Reflection questions generated");
        Ok(result)
    }
}
