//! Port trait definitions (Hexagonal Architecture)
//!
//! Interfaces the pipeline needs from the outside world:
//! - NotationService: PGN/FEN to position conversion
//! - EngineDriver / StaticEvaluator: the UCI engine process
//! - MessagePublisher / Acknowledger: the message broker
//! - FallbackSink: best-effort destinations for rejected payloads

pub mod broker;
pub mod engine;
pub mod fallback;
pub mod notation;

pub use broker::{Acknowledger, Confirm, MessagePublisher, OutboundMessage};
pub use engine::{EngineDriver, StaticEvaluator, StopHandle};
pub use fallback::FallbackSink;
pub use notation::NotationService;
