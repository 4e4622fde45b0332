//! Error types for the associations repository.
//! Defines specific errors that can occur during database operations on
//! profile links and votes.
use thiserror::Error;

/// Represents errors that can occur within the associations repository.
///
/// This enum consolidates database failures, uniqueness conflicts and rows
/// that cannot be decoded back into shared types.
#[derive(Debug, Error)]
pub enum AssociationsRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A uniqueness key was claimed by another writer.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid stored content reference: {0}")]
    InvalidContentRef(String),
}

impl AssociationsRepositoryError {
    /// Create a conflict error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
