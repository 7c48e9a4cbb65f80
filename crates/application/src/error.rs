use domain::DomainError;
use mediator::MediatorError;
use persistence::PersistenceError;
use thiserror::Error;

/// Errors returned by use-case handlers.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The request itself is malformed.
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness or reference constraint blocks the operation.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Persistence(PersistenceError),

    /// No handler, or more than one, is registered for the request.
    #[error("Mediator misconfigured: {0}")]
    Configuration(#[from] MediatorError),
}

impl ApplicationError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<PersistenceError> for ApplicationError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { entity, id } => Self::NotFound { entity, id },
            PersistenceError::UniqueViolation { .. }
            | PersistenceError::ForeignKeyViolation { .. } => Self::Conflict(err.to_string()),
            other => Self::Persistence(other),
        }
    }
}

/// Result type for use cases.
pub type Result<T> = std::result::Result<T, ApplicationError>;
