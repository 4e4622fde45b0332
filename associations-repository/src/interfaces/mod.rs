//! This module defines and re-exports the interfaces for the associations repository.
mod associations;

pub use associations::{AssociationsRepository, CreateOutcome};
