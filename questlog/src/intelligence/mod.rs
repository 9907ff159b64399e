pub mod insight;
pub mod parser;
pub mod quest;
pub mod reflection;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use insight::DailyInsightAnalyzer;
pub use parser::{parse_analysis, parse_structured, FALLBACK_QUESTIONS};
pub use quest::QuestOrchestrator;
pub use reflection::ReflectionOrchestrator;
pub use types::{
    AnalysisResult, DailyInsight, ParseOutcome, ParsedAnalysis, PipelineStage, QuestionsResult,
    QuestsResult,
};
