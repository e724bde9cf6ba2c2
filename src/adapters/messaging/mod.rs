//! Broker-facing message intake and wire formats.
//!
//! Every inbound delivery goes through [`intake::consume`]: envelope check,
//! per-queue handler, then an ack/nack decision settled through the
//! delivery's acknowledger.

pub mod dto;
pub mod envelope;
pub mod errors;
pub mod handlers;
pub mod in_memory;
pub mod intake;
pub mod mapper;

pub use envelope::{Delivery, Envelope};
pub use errors::IntakeError;
pub use handlers::{StaticEvaluationHandler, SubmitTaskHandler};
pub use in_memory::{InMemoryBroker, PublishBehavior, RecordingAcknowledger, RecordingSink, Settlement};
pub use intake::{consume, decide, AckDecision, IntakeRouter, MessageHandler};
pub use mapper::SubmitTaskMapper;
