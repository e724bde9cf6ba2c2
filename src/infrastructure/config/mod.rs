//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading (`.kibitzer/config.yaml`, `.kibitzer/local.yaml`)
//! - Environment variable overrides (`KIBITZER_*`)
//! - Validation after extraction

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
