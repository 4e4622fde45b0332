//! Error types for the associations service.
//! Separates resolution failures of content references from the errors
//! surfaced by store, ranking and sweep operations.
mod association;
mod resolve;

pub use association::AssociationError;
pub use resolve::{LookupError, ResolveError};
