use associations_shared::types::{ContentKind, ContentRef};
use thiserror::Error;

/// Failure reported by a content lookup backend.
///
/// Distinct from "entity not found": lookups return `Ok(None)` for a missing entity.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct LookupError(pub String);

impl From<sqlx::Error> for LookupError {
    fn from(err: sqlx::Error) -> Self {
        Self(err.to_string())
    }
}

/// Errors raised while resolving a `ContentRef` through the registry.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The kind is registered but no entity has this id.
    #[error("Content not found: {0}")]
    NotFound(ContentRef),

    /// The kind was never registered. Always a configuration error.
    #[error("Unknown content kind: {0}")]
    UnknownKind(ContentKind),

    #[error("Lookup failed for {content_ref}: {source}")]
    Lookup {
        content_ref: ContentRef,
        source: LookupError,
    },
}
