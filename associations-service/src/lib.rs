//! # Associations Service
//!
//! Generic association of auxiliary records (profile links, votes) with any
//! content entity of the platform, plus the queries built on top of them.
//!
//! ## Modules
//!
//! - [`registry`]: closed registry resolving `ContentRef`s through per-kind lookups
//! - [`store`]: create-or-get, update, delete and listing of associations
//! - [`ranking`]: best-linked-profiles ranking and vote tallies
//! - [`sweeper`]: maintenance pass deleting associations whose content is gone
//! - [`vote_kinds`]: the configured vote types
//! - [`config`]: service tuning knobs
//! - [`errors`]: error types for the service

pub mod config;
pub mod errors;
pub mod ranking;
pub mod registry;
pub mod store;
pub mod sweeper;
pub mod vote_kinds;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::ServiceConfig;
pub use errors::{AssociationError, LookupError, ResolveError};
pub use ranking::RankingQuery;
pub use registry::{ContentLookup, ContentRegistry, ContentRegistryBuilder, PostgresTableLookup};
pub use store::AssociationStore;
pub use sweeper::OrphanSweeper;
pub use vote_kinds::VoteKindCatalog;
