//! Publication of analysis results with fallback delivery.
//!
//! Final evaluations go to the broker as persistent messages. When the broker
//! refuses the send, or later nacks it, the same payload is handed to every
//! configured [`FallbackSink`] concurrently. Static evaluations are published
//! without a fallback.

use futures::future::join_all;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::adapters::messaging::dto::{EvaluationMessage, StaticEvaluationMessage};
use crate::domain::ports::{Confirm, FallbackSink, MessagePublisher, OutboundMessage};

use super::analysis_events::FinalEvaluation;

/// How a publication settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The broker acked the message.
    Confirmed,
    /// The broker refused or nacked; the payload went to the fallback sinks.
    FellBack,
    /// No confirmation arrived (channel dropped) or the payload never left.
    Unconfirmed,
}

/// Handle on a publication still waiting for its broker confirmation.
#[derive(Debug)]
pub struct PublishTicket(JoinHandle<PublishOutcome>);

impl PublishTicket {
    fn settled(outcome: PublishOutcome) -> Self {
        Self(tokio::spawn(async move { outcome }))
    }

    /// Wait for the confirmation and any fallback delivery to finish.
    pub async fn outcome(self) -> PublishOutcome {
        match self.0.await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(error = %err, "publication task aborted");
                PublishOutcome::Unconfirmed
            }
        }
    }
}

/// Fans a payload out to every fallback sink.
#[derive(Clone, Default)]
pub struct FallbackDispatcher {
    sinks: Vec<Arc<dyn FallbackSink>>,
}

impl FallbackDispatcher {
    pub fn new(sinks: Vec<Arc<dyn FallbackSink>>) -> Self {
        Self { sinks }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub async fn deliver(&self, exchange: &str, payload: &[u8]) {
        if self.sinks.is_empty() {
            tracing::error!(exchange, "no fallback sink configured, payload lost");
            return;
        }
        let deliveries = self.sinks.iter().map(|sink| {
            tracing::info!(exchange, sink = sink.name(), "delivering payload to fallback sink");
            sink.deliver(exchange, payload)
        });
        join_all(deliveries).await;
    }
}

/// Publishes final evaluations on the evaluation exchange.
pub struct ResultPublisher {
    broker: Arc<dyn MessagePublisher>,
    fallback: FallbackDispatcher,
    exchange: String,
}

impl ResultPublisher {
    pub fn new(broker: Arc<dyn MessagePublisher>, fallback: FallbackDispatcher, exchange: impl Into<String>) -> Self {
        Self {
            broker,
            fallback,
            exchange: exchange.into(),
        }
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// Publish the summary of a finished run.
    pub async fn publish_final(&self, final_evaluation: &FinalEvaluation) -> PublishTicket {
        let task_id = final_evaluation.run.task_id.to_string();
        let message = EvaluationMessage::from(final_evaluation);
        let payload = match serde_json::to_vec(&message) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(task_id = %task_id, error = %err, "failed to serialize evaluation message");
                return PublishTicket::settled(PublishOutcome::Unconfirmed);
            }
        };
        tracing::info!(
            task_id = %task_id,
            status = %message.status,
            depth = final_evaluation.evaluation.max_depth(),
            "publishing final evaluation"
        );
        self.publish(payload, task_id).await
    }

    /// Send a payload and settle it in the background.
    pub async fn publish(&self, payload: Vec<u8>, correlation_id: String) -> PublishTicket {
        let message = OutboundMessage::new(&self.exchange, payload.clone())
            .persistent()
            .with_correlation_id(correlation_id.clone())
            .with_header("content_type", "application/json");
        let fallback = self.fallback.clone();
        let exchange = self.exchange.clone();

        match self.broker.send(message).await {
            Err(err) => {
                tracing::warn!(correlation_id = %correlation_id, error = %err, "broker send failed, using fallback");
                PublishTicket(tokio::spawn(async move {
                    fallback.deliver(&exchange, &payload).await;
                    PublishOutcome::FellBack
                }))
            }
            Ok(confirm) => PublishTicket(tokio::spawn(async move {
                match confirm.await {
                    Ok(Confirm::Ack) => {
                        tracing::debug!(correlation_id = %correlation_id, "broker confirmed publication");
                        PublishOutcome::Confirmed
                    }
                    Ok(Confirm::Nack) => {
                        tracing::warn!(correlation_id = %correlation_id, "broker nacked publication, using fallback");
                        fallback.deliver(&exchange, &payload).await;
                        PublishOutcome::FellBack
                    }
                    Err(_) => {
                        tracing::warn!(correlation_id = %correlation_id, "confirmation channel closed before settlement");
                        PublishOutcome::Unconfirmed
                    }
                }
            })),
        }
    }
}

/// Publishes static evaluations; failures are logged only.
pub struct StaticEvaluationPublisher {
    broker: Arc<dyn MessagePublisher>,
    exchange: String,
}

impl StaticEvaluationPublisher {
    pub fn new(broker: Arc<dyn MessagePublisher>, exchange: impl Into<String>) -> Self {
        Self {
            broker,
            exchange: exchange.into(),
        }
    }

    pub async fn publish(&self, message: &StaticEvaluationMessage) -> PublishTicket {
        let payload = match serde_json::to_vec(message) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize static evaluation");
                return PublishTicket::settled(PublishOutcome::Unconfirmed);
            }
        };
        match self.broker.send(OutboundMessage::new(&self.exchange, payload)).await {
            Err(err) => {
                tracing::error!(fen = %message.request.fen, error = %err, "static evaluation not published");
                PublishTicket::settled(PublishOutcome::Unconfirmed)
            }
            Ok(confirm) => {
                let fen = message.request.fen.clone();
                PublishTicket(tokio::spawn(async move {
                    match confirm.await {
                        Ok(Confirm::Ack) => PublishOutcome::Confirmed,
                        Ok(Confirm::Nack) | Err(_) => {
                            tracing::warn!(fen = %fen, "static evaluation not confirmed");
                            PublishOutcome::Unconfirmed
                        }
                    }
                }))
            }
        }
    }
}
