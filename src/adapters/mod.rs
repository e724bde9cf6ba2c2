//! Adapters implementing the domain ports and the broker-facing edges.

pub mod cache;
pub mod engine;
pub mod fallback;
pub mod messaging;
pub mod notation;
