use crate::backend::storage::StoreError;

/// Errors surfaced by the domain services
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Input rejected before anything was written
    #[error("{0}")]
    Validation(String),
    /// The write would duplicate an existing record
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("could not render report: {0}")]
    Render(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }
}
