pub mod context;
pub mod error;
pub mod file;

pub use context::ContextView;
pub use error::SessionError;
pub use file::{QaPair, UploadedFile};

use std::sync::Arc;
use summarize::{Category, FollowupResponder, SummaryGenerator, SummaryLimits, TextCompletion};
use tracing::info;

/// The model-backed operations a session needs.
pub struct Assistant {
    pub generator: SummaryGenerator,
    pub responder: FollowupResponder,
}

impl Assistant {
    pub fn new(llm: Arc<dyn TextCompletion>, limits: SummaryLimits) -> Self {
        Self {
            generator: SummaryGenerator::new(llm.clone()).with_limits(limits),
            responder: FollowupResponder::new(llm),
        }
    }
}

/// Everything one user has uploaded and asked during a session.
///
/// Files are addressed by upload position; uploading the same name twice
/// creates two independent entries.
#[derive(Debug, Clone)]
pub struct StudySession {
    course_name: String,
    files: Vec<UploadedFile>,
}

impl StudySession {
    pub fn new(course_name: impl Into<String>) -> Result<Self, SessionError> {
        let course_name = course_name.into();
        if course_name.trim().is_empty() {
            return Err(SessionError::EmptyCourseName);
        }

        Ok(Self {
            course_name,
            files: Vec::new(),
        })
    }

    pub fn course_name(&self) -> &str {
        &self.course_name
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn file(&self, index: usize) -> Result<&UploadedFile, SessionError> {
        self.files.get(index).ok_or(SessionError::FileNotFound(index))
    }

    fn file_mut(&mut self, index: usize) -> Result<&mut UploadedFile, SessionError> {
        self.files.get_mut(index).ok_or(SessionError::FileNotFound(index))
    }

    /// Record a new upload and return its index.
    pub fn upload(&mut self, name: impl Into<String>, category: Category, content: impl Into<String>) -> usize {
        let file = UploadedFile::new(name.into(), category, content.into());
        info!(
            course = %self.course_name,
            file = %file.name(),
            %category,
            index = self.files.len(),
            "File uploaded"
        );
        self.files.push(file);
        self.files.len() - 1
    }

    /// Return the file's summary, generating and caching it on first use.
    pub async fn ensure_summary(
        &mut self,
        index: usize,
        assistant: &Assistant,
    ) -> Result<String, SessionError> {
        let course_name = self.course_name.clone();
        let file = self.file_mut(index)?;

        if let Some(summary) = file.summary() {
            return Ok(summary.to_string());
        }

        let summary = assistant
            .generator
            .summarize(file.content(), file.category(), &course_name)
            .await?;
        file.set_summary(summary.clone());

        Ok(summary)
    }

    /// Summaries of every file, generating any that are still missing.
    pub async fn global_context(&mut self, assistant: &Assistant) -> Result<String, SessionError> {
        for index in 0..self.files.len() {
            self.ensure_summary(index, assistant).await?;
        }
        Ok(context::global_context(&self.files))
    }

    pub fn conversation_history(&self, index: usize) -> Result<String, SessionError> {
        Ok(context::conversation_history(self.file(index)?.chat_history()))
    }

    /// Answer a follow-up question about one file and append it to that file's history.
    ///
    /// Nothing is recorded if the model call fails.
    pub async fn ask(
        &mut self,
        index: usize,
        question: &str,
        view: ContextView,
        assistant: &Assistant,
    ) -> Result<String, SessionError> {
        if question.trim().is_empty() {
            return Err(SessionError::EmptyQuestion);
        }

        self.ensure_summary(index, assistant).await?;
        let global = match view {
            ContextView::Current => self.global_context(assistant).await?,
            ContextView::History => String::new(),
        };

        let context = context::question_context(view, self.file(index)?, &global, question);
        let answer = assistant
            .responder
            .respond(&context, &self.course_name)
            .await?;

        let file = self.file_mut(index)?;
        file.push_exchange(question.to_string(), answer.clone());
        info!(
            file = %file.name(),
            exchanges = file.chat_history().len(),
            ?view,
            "Follow-up answered"
        );

        Ok(answer)
    }
}
