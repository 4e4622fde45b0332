//! Associations Maintenance Binary
//!
//! Environment configuration, dependency wiring and the commands run by the
//! maintenance scheduler and operators.

pub mod commands;
pub mod config;
pub mod errors;

pub use commands::Command;
pub use config::{Dependencies, LogFormat, Settings};
pub use errors::AppError;
