//! Generic intake: envelope check, handler dispatch, ack/nack decision.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::Instrument;

use super::envelope::{Delivery, Envelope};
use super::errors::IntakeError;

/// How a delivery is settled with the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckDecision {
    Ack,
    Nack { requeue: bool },
}

/// Handler for one message kind.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Short name used in logs.
    fn kind(&self) -> &'static str;

    async fn handle(&self, envelope: &Envelope, body: &[u8]) -> Result<(), IntakeError>;
}

/// Map a handler result onto an ack decision.
///
/// A requeue request is honoured once: a message that was already
/// redelivered is dropped instead.
pub fn decide(result: &Result<(), IntakeError>, redelivered: bool) -> AckDecision {
    match result {
        Ok(()) => AckDecision::Ack,
        Err(err) if err.is_requeue() => AckDecision::Nack { requeue: !redelivered },
        Err(_) => AckDecision::Nack { requeue: false },
    }
}

/// Run one delivery through `handler` and settle it.
pub async fn consume(delivery: Delivery, handler: &dyn MessageHandler) -> AckDecision {
    let envelope = match delivery.envelope() {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::error!(queue = %delivery.queue, error = %err, "unrecognised delivery, dropping");
            let decision = AckDecision::Nack { requeue: false };
            settle(&delivery, decision).await;
            return decision;
        }
    };

    let span = tracing::info_span!(
        "intake",
        kind = handler.kind(),
        queue = %envelope.queue,
        exchange = %envelope.exchange,
        routing_key = %envelope.routing_key,
        correlation_id = envelope.correlation_id.as_deref().unwrap_or(""),
        redelivered = envelope.redelivered,
    );

    async {
        let result = handler.handle(&envelope, &delivery.body).await;
        let decision = decide(&result, envelope.redelivered);
        match (&result, decision) {
            (Ok(()), _) => tracing::debug!("message handled"),
            (Err(err), AckDecision::Nack { requeue: true }) => {
                tracing::warn!(error = %err, "handler asked for redelivery");
            }
            (Err(err), _) if err.is_requeue() => {
                tracing::error!(error = %err, "redelivered message still failing, dropping");
            }
            (Err(err), _) => tracing::error!(error = %err, "message rejected"),
        }
        settle(&delivery, decision).await;
        decision
    }
    .instrument(span)
    .await
}

async fn settle(delivery: &Delivery, decision: AckDecision) {
    let settled = match decision {
        AckDecision::Ack => delivery.acker.ack().await,
        AckDecision::Nack { requeue } => delivery.acker.nack(requeue).await,
    };
    if let Err(err) = settled {
        tracing::error!(queue = %delivery.queue, error = %err, ?decision, "failed to settle delivery");
    }
}

/// Dispatch table from queue name to handler.
#[derive(Default, Clone)]
pub struct IntakeRouter {
    handlers: HashMap<String, Arc<dyn MessageHandler>>,
}

impl IntakeRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `queue`, replacing any earlier binding.
    pub fn subscribe(&mut self, queue: impl Into<String>, handler: Arc<dyn MessageHandler>) -> &mut Self {
        let queue = queue.into();
        tracing::info!(queue = %queue, kind = handler.kind(), "queue subscribed");
        self.handlers.insert(queue, handler);
        self
    }

    pub fn queues(&self) -> Vec<&str> {
        let mut queues: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        queues.sort_unstable();
        queues
    }

    /// Consume a delivery with the handler bound to its queue.
    pub async fn dispatch(&self, delivery: Delivery) -> AckDecision {
        match self.handlers.get(&delivery.queue) {
            Some(handler) => consume(delivery, handler.as_ref()).await,
            None => {
                tracing::error!(queue = %delivery.queue, "no handler bound to queue");
                let decision = AckDecision::Nack { requeue: false };
                settle(&delivery, decision).await;
                decision
            }
        }
    }
}
