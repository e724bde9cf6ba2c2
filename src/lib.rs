//! Kibitzer - chess analysis orchestrator
//!
//! Kibitzer takes analysis requests off a message broker, serialises them
//! onto a single UCI engine, folds the streamed engine output into
//! evaluation snapshots until the principal variations converge, and
//! publishes the final evaluation with best-effort fallback delivery.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Service Layer** (`services`): convergence, engine lock, orchestration, publication
//! - **Adapters** (`adapters`): caches, message intake, fallback sinks, engine and notation
//! - **Application Layer** (`application`): explicit pipeline wiring
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): operator commands

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{Collaborators, Pipeline};
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    AnalysisLimit, AnalysisRun, Config, EngineObservation, Evaluation, LoggingConfig, Position,
    Score, TaskId,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AnalysisQueries, AnalysisService};
