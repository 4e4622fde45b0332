use crate::errors::ResolveError;
use associations_repository::AssociationsRepositoryError;
use associations_shared::types::{ContentKind, ContentRefError};
use thiserror::Error;

/// Errors surfaced by store, ranking and sweep operations.
///
/// The HTTP layer maps these to user-visible responses: `NotFound` and
/// `ValidationError` are client errors, `UnknownKind` is a configuration error,
/// `Conflict` may be retried as a lookup.
#[derive(Debug, Error)]
pub enum AssociationError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown content kind: {0}")]
    UnknownKind(ContentKind),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content lookup error: {0}")]
    LookupError(String),

    #[error("Repository error: {0}")]
    Repository(AssociationsRepositoryError),
}

impl AssociationError {
    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}

impl From<AssociationsRepositoryError> for AssociationError {
    fn from(err: AssociationsRepositoryError) -> Self {
        match err {
            AssociationsRepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Repository(other),
        }
    }
}

impl From<ResolveError> for AssociationError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound(content_ref) => Self::NotFound(format!("content {content_ref}")),
            ResolveError::UnknownKind(kind) => Self::UnknownKind(kind),
            lookup @ ResolveError::Lookup { .. } => Self::LookupError(lookup.to_string()),
        }
    }
}

impl From<ContentRefError> for AssociationError {
    fn from(err: ContentRefError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
