//! # Associations Shared
//! This crate defines the data structures shared across the associations workspace:
//! polymorphic content references, profile links, votes, filters and the result
//! types of the ranking and sweep operations.
pub mod ranking;
pub mod types;

pub use ranking::rank_profile_links;
