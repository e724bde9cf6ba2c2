//! Application layer: wiring of the analysis pipeline.

pub mod pipeline;

pub use pipeline::{fallback_sinks_from_config, Collaborators, Pipeline};
