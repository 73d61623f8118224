use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("todo not found")]
    NotFound,

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl RepoError {
    /// True for failures caused by the caller's context rather than the store.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, RepoError::Cancelled | RepoError::DeadlineExceeded)
    }
}

pub type RepoResult<T> = Result<T, RepoError>;
