//! Configuration module for the associations binary.
//! Reads settings from the environment and wires the service dependencies.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{ContentKindSource, LogFormat, Settings};
