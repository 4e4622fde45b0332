//! Error types for the associations binary.
//! Consolidates configuration problems with the errors of the repository and
//! service crates.
use associations_repository::AssociationsRepositoryError;
use associations_service::AssociationError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] AssociationsRepositoryError),
    #[error("Association error: {0}")]
    Association(#[from] AssociationError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Interrupted before completion")]
    Interrupted,
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
