use serde::{Deserialize, Serialize};

use crate::file::{QaPair, UploadedFile};

/// Which layout the follow-up context uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextView {
    /// Chat on the file just uploaded: every file's summary plus this file's history.
    #[default]
    Current,
    /// Revisiting a file from the upload history: only this file's summary and history.
    History,
}

/// "File Summaries:" block covering every uploaded file.
pub fn global_context(files: &[UploadedFile]) -> String {
    let mut context = String::from("File Summaries:\n");
    for file in files {
        context.push_str(&format!(
            "{} (Category: {}):\n{}\n\n",
            file.name(),
            file.category(),
            file.summary().unwrap_or_default()
        ));
    }
    context
}

pub fn conversation_history(history: &[QaPair]) -> String {
    history
        .iter()
        .map(|qa| format!("Q: {}\nA: {}\n", qa.question, qa.answer))
        .collect()
}

/// Full context for the responder: background, prior exchanges, then the question.
pub fn question_context(
    view: ContextView,
    file: &UploadedFile,
    global: &str,
    question: &str,
) -> String {
    let history = conversation_history(file.chat_history());

    let mut context = match view {
        ContextView::Current => format!("Global Context:\n{}\n", global),
        ContextView::History => format!("File Summary:\n{}\n", file.summary().unwrap_or_default()),
    };

    if !history.is_empty() {
        match view {
            ContextView::Current => context.push_str(&format!(
                "Conversation History for {}:\n{}\n",
                file.name(),
                history
            )),
            ContextView::History => {
                context.push_str(&format!("Previous Conversation:\n{}\n", history))
            }
        }
    }

    context.push_str(&format!("New Question: {}\n", question));
    context
}
