//! In-memory bounded caches acting as the system of record.
//!
//! Nothing is persisted: every repository here is a fixed-capacity map with
//! recency-based eviction, safe to share between the engine-streaming path
//! and query callers.

pub mod bounded;
pub mod evaluation_cache;
pub mod observation_cache;
pub mod task_cache;

pub use bounded::{BoundedCache, CacheSlots};
pub use evaluation_cache::EvaluationCache;
pub use observation_cache::ObservationCache;
pub use task_cache::TaskCache;
