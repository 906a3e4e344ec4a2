use serde::{Deserialize, Serialize};
use summarize::Category;

/// One question and the answer it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// An uploaded document with its lazily generated summary and chat history.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    name: String,
    category: Category,
    content: String,
    summary: Option<String>,
    chat_history: Vec<QaPair>,
}

impl UploadedFile {
    pub(crate) fn new(name: String, category: Category, content: String) -> Self {
        Self {
            name,
            category,
            content,
            summary: None,
            chat_history: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn chat_history(&self) -> &[QaPair] {
        &self.chat_history
    }

    pub(crate) fn set_summary(&mut self, summary: String) {
        self.summary = Some(summary);
    }

    pub(crate) fn push_exchange(&mut self, question: String, answer: String) {
        self.chat_history.push(QaPair { question, answer });
    }
}
