use thiserror::Error;

/// Failure reported by the persistence collaborator.
///
/// Everything in here is treated as unexpected by the submission core: it is
/// logged, surfaced to the user generically and never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Entity '{0}' with id '{1}' not found")]
    Missing(String, String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
