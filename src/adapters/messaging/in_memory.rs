//! In-process broker, acknowledger and fallback sink.
//!
//! Used by the `replay` command and by tests. Publications are recorded and
//! settled according to a configurable [`PublishBehavior`].

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{Acknowledger, Confirm, FallbackSink, MessagePublisher, OutboundMessage};

/// How the in-memory broker settles a publication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PublishBehavior {
    #[default]
    Ack,
    Nack,
    /// Refuse the send synchronously.
    FailSend,
    /// Accept the send and never confirm it.
    DropConfirm,
}

/// Broker double that records every accepted message.
#[derive(Default)]
pub struct InMemoryBroker {
    behavior: Mutex<PublishBehavior>,
    published: Mutex<Vec<OutboundMessage>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: PublishBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            published: Mutex::new(Vec::new()),
        }
    }

    pub async fn set_behavior(&self, behavior: PublishBehavior) {
        *self.behavior.lock().await = behavior;
    }

    /// Messages accepted so far, in send order.
    pub async fn published(&self) -> Vec<OutboundMessage> {
        self.published.lock().await.clone()
    }

    pub async fn published_on(&self, exchange: &str) -> Vec<OutboundMessage> {
        self.published
            .lock()
            .await
            .iter()
            .filter(|message| message.exchange == exchange)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl MessagePublisher for InMemoryBroker {
    async fn send(&self, message: OutboundMessage) -> DomainResult<oneshot::Receiver<Confirm>> {
        let behavior = *self.behavior.lock().await;
        if behavior == PublishBehavior::FailSend {
            return Err(DomainError::Broker(format!(
                "exchange {} refused the message",
                message.exchange
            )));
        }

        tracing::debug!(exchange = %message.exchange, bytes = message.payload.len(), "message accepted");
        self.published.lock().await.push(message);

        let (confirm, receiver) = oneshot::channel();
        match behavior {
            PublishBehavior::Ack => {
                let _ = confirm.send(Confirm::Ack);
            }
            PublishBehavior::Nack => {
                let _ = confirm.send(Confirm::Nack);
            }
            PublishBehavior::DropConfirm | PublishBehavior::FailSend => drop(confirm),
        }
        Ok(receiver)
    }
}

/// How a delivery was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Acked,
    Nacked { requeue: bool },
}

/// Acknowledger recording how its delivery was settled.
#[derive(Debug, Default)]
pub struct RecordingAcknowledger {
    settlements: Mutex<Vec<Settlement>>,
}

impl RecordingAcknowledger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn settlements(&self) -> Vec<Settlement> {
        self.settlements.lock().await.clone()
    }

    pub async fn last(&self) -> Option<Settlement> {
        self.settlements.lock().await.last().copied()
    }
}

#[async_trait]
impl Acknowledger for RecordingAcknowledger {
    async fn ack(&self) -> DomainResult<()> {
        self.settlements.lock().await.push(Settlement::Acked);
        Ok(())
    }

    async fn nack(&self, requeue: bool) -> DomainResult<()> {
        self.settlements.lock().await.push(Settlement::Nacked { requeue });
        Ok(())
    }
}

/// Fallback sink keeping payloads in memory.
pub struct RecordingSink {
    name: &'static str,
    deliveries: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingSink {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            deliveries: Mutex::new(Vec::new()),
        }
    }

    pub async fn deliveries(&self) -> Vec<(String, Vec<u8>)> {
        self.deliveries.lock().await.clone()
    }
}

#[async_trait]
impl FallbackSink for RecordingSink {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn deliver(&self, exchange: &str, payload: &[u8]) {
        self.deliveries
            .lock()
            .await
            .push((exchange.to_string(), payload.to_vec()));
    }
}
