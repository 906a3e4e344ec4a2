pub mod followup;
pub mod llm;
pub mod ollama;
pub mod openai;
pub mod prompt;
pub mod retry;
pub mod schema;
pub mod summarizer;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use followup::FollowupResponder;
pub use llm::{CompletionError, CompletionSettings, TextCompletion};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use retry::{RetryPolicy, RetryingCompletion};
pub use schema::Category;
pub use summarizer::{INVALID_CATEGORY, SummaryGenerator, SummaryLimits, SummaryPlan, plan_summary};
