use thiserror::Error;

/// Errors that can occur when reading or committing entities.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A unique column already holds this value.
    #[error("{entity} with {field} '{value}' already exists")]
    UniqueViolation {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// The entity cannot be deleted while other rows point at it.
    #[error("{entity} {id} is still referenced by {referenced_by}")]
    ForeignKeyViolation {
        entity: &'static str,
        id: String,
        referenced_by: &'static str,
    },

    /// A stored row could not be turned back into an entity.
    #[error("Cannot decode {entity} row: {reason}")]
    Serialization { entity: &'static str, reason: String },

    /// The store refused the commit.
    #[error("Commit rejected: {0}")]
    CommitRejected(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
