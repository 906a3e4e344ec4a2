use std::sync::Arc;
use tracing::info;

use crate::llm::{CompletionError, TextCompletion};
use crate::prompt;

/// Answers follow-up questions from an already assembled context.
///
/// The context is sent as-is; keeping it within the model's input limit is
/// the caller's job.
pub struct FollowupResponder {
    llm: Arc<dyn TextCompletion>,
}

impl FollowupResponder {
    pub fn new(llm: Arc<dyn TextCompletion>) -> Self {
        Self { llm }
    }

    pub async fn respond(&self, context: &str, course_name: &str) -> Result<String, CompletionError> {
        info!(course = course_name, context_chars = context.len(), "Answering follow-up question");

        let prompt = prompt::build_followup_prompt(context, course_name);
        self.llm.complete(&prompt).await
    }
}
