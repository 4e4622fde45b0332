//! Error types for the associations repository.
//! Consolidates and re-exports error types related to association storage.
mod associations;

pub use associations::AssociationsRepositoryError;
