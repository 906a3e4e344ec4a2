use summarize::CompletionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Please enter the course name!")]
    EmptyCourseName,

    #[error("Please enter a question.")]
    EmptyQuestion,

    #[error("No uploaded file at index {0}")]
    FileNotFound(usize),

    #[error(transparent)]
    Completion(#[from] CompletionError),
}
