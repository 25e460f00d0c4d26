use crate::domain::dialogue::DialogueError;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum JobServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
}

impl From<DialogueError> for JobServiceError {
    fn from(err: DialogueError) -> Self {
        JobServiceError::Invalid(err.to_string())
    }
}

impl From<JobServiceError> for AppError {
    fn from(err: JobServiceError) -> Self {
        match err {
            JobServiceError::Invalid(msg) => AppError::BadRequest(msg),
        }
    }
}
