//! Analysis pipeline services.
//!
//! - `convergence`: pure PV-stability and early-stop predicates
//! - `engine_lock`: single-holder engine mutual exclusion
//! - `analysis_service`: submission, deduplication and observation folding
//! - `analysis_events`: in-process events and their fixed listeners
//! - `result_publisher`: broker publication with fallback sinks
//! - `analysis_queries`: read-side queries over the caches

pub mod analysis_events;
pub mod analysis_queries;
pub mod analysis_service;
pub mod convergence;
pub mod engine_lock;
pub mod result_publisher;

pub use analysis_events::{spawn_event_listeners, AnalysisEvent, AnalysisEvents, FinalEvaluation};
pub use analysis_queries::AnalysisQueries;
pub use analysis_service::{AnalysisService, Caches};
pub use engine_lock::{EngineLease, EngineLock};
pub use result_publisher::{
    FallbackDispatcher, PublishOutcome, PublishTicket, ResultPublisher, StaticEvaluationPublisher,
};
