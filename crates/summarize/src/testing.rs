//! Test doubles for [`TextCompletion`].

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Mutex;

use crate::llm::{CompletionError, TextCompletion};

enum Reply {
    Fixed(String),
    Numbered,
}

/// Records every prompt and answers without touching the network.
pub struct RecordingCompletion {
    reply: Reply,
    failures: usize,
    prompts: Mutex<Vec<String>>,
}

impl RecordingCompletion {
    /// Always answers with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Reply::Fixed(text.into()),
            failures: 0,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answers "response N" for the N-th call, starting at 1.
    pub fn numbered() -> Self {
        Self {
            reply: Reply::Numbered,
            failures: 0,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fails the first `failures` calls with a 503, then answers with `text`.
    pub fn failing_first(failures: usize, text: impl Into<String>) -> Self {
        Self {
            failures,
            ..Self::replying(text)
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }
}

#[async_trait]
impl TextCompletion for RecordingCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let call = {
            let mut prompts = self
                .prompts
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            prompts.push(prompt.to_string());
            prompts.len()
        };

        if call <= self.failures {
            return Err(CompletionError::Status {
                provider: "stub",
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: format!("failure {}", call),
            });
        }

        Ok(match &self.reply {
            Reply::Fixed(text) => text.clone(),
            Reply::Numbered => format!("response {}", call),
        })
    }
}
