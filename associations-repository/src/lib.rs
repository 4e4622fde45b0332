//! # Associations Repository
//! This crate provides the storage interface for association records (profile
//! links and votes) attached to arbitrary content entities. It includes the error
//! types, the `AssociationsRepository` trait, a PostgreSQL implementation and an
//! in-memory implementation.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::AssociationsRepositoryError;
pub use interfaces::{AssociationsRepository, CreateOutcome};
pub use memory::InMemoryAssociationsRepository;
pub use postgres::{PostgresAssociationsRepository, run_migrations};
