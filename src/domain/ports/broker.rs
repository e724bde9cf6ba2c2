//! Message broker ports.
//!
//! Publishing is confirm-based: a successful `send` only means the broker
//! accepted the frame, the positive or negative confirmation arrives later on
//! the returned channel.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::oneshot;

use crate::domain::errors::DomainResult;

/// Broker confirmation for one published message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Ack,
    Nack,
}

/// A message ready to be handed to the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub exchange: String,
    pub routing_key: String,
    pub correlation_id: Option<String>,
    pub headers: BTreeMap<String, String>,
    /// Persistent delivery mode (survives broker restarts).
    pub persistent: bool,
    pub payload: Vec<u8>,
}

impl OutboundMessage {
    pub fn new(exchange: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            exchange: exchange.into(),
            routing_key: String::new(),
            correlation_id: None,
            headers: BTreeMap::new(),
            persistent: false,
            payload,
        }
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Publishing side of the broker.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Hand a message to the broker. An `Err` is a synchronous send failure.
    async fn send(&self, message: OutboundMessage) -> DomainResult<oneshot::Receiver<Confirm>>;
}

/// Settles one inbound delivery.
#[async_trait]
pub trait Acknowledger: Send + Sync {
    async fn ack(&self) -> DomainResult<()>;

    async fn nack(&self, requeue: bool) -> DomainResult<()>;
}
