mod api;
pub mod gemini;
pub mod prompts;
mod provider;
mod schema;

pub use api::LlmApiClient;
pub use gemini::GeminiClient;
pub use provider::{GenerationOptions, GenerativeModel, LlmBackend, LlmProvider};
pub use schema::{JsonSchemaSpec, StructuredOutput};
