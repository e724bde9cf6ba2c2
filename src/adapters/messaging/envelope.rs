//! Inbound deliveries and their transport metadata.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::ports::Acknowledger;

use super::errors::IntakeError;

/// One message as handed over by the broker.
#[derive(Clone)]
pub struct Delivery {
    /// Queue the message was consumed from.
    pub queue: String,
    pub exchange: Option<String>,
    pub routing_key: Option<String>,
    pub delivery_tag: Option<u64>,
    pub correlation_id: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub redelivered: bool,
    pub body: Vec<u8>,
    pub acker: Arc<dyn Acknowledger>,
}

impl std::fmt::Debug for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delivery")
            .field("queue", &self.queue)
            .field("exchange", &self.exchange)
            .field("routing_key", &self.routing_key)
            .field("delivery_tag", &self.delivery_tag)
            .field("correlation_id", &self.correlation_id)
            .field("redelivered", &self.redelivered)
            .field("bytes", &self.body.len())
            .finish_non_exhaustive()
    }
}

impl Delivery {
    /// A delivery on `queue` routed through the default exchange.
    pub fn new(queue: impl Into<String>, delivery_tag: u64, body: Vec<u8>, acker: Arc<dyn Acknowledger>) -> Self {
        let queue = queue.into();
        Self {
            routing_key: Some(queue.clone()),
            queue,
            exchange: Some(String::new()),
            delivery_tag: Some(delivery_tag),
            correlation_id: None,
            headers: BTreeMap::new(),
            redelivered: false,
            body,
            acker,
        }
    }

    pub fn redelivered(mut self, redelivered: bool) -> Self {
        self.redelivered = redelivered;
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Extract the transport metadata handlers log against.
    pub fn envelope(&self) -> Result<Envelope, IntakeError> {
        let delivery_tag = self
            .delivery_tag
            .ok_or_else(|| IntakeError::MalformedEnvelope("missing delivery tag".to_string()))?;
        let exchange = self
            .exchange
            .clone()
            .ok_or_else(|| IntakeError::MalformedEnvelope("missing exchange".to_string()))?;
        let routing_key = self
            .routing_key
            .clone()
            .ok_or_else(|| IntakeError::MalformedEnvelope("missing routing key".to_string()))?;

        Ok(Envelope {
            queue: self.queue.clone(),
            exchange,
            routing_key,
            delivery_tag,
            correlation_id: self.correlation_id.clone(),
            headers: self.headers.clone(),
            redelivered: self.redelivered,
        })
    }
}

/// Recognised transport metadata of a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub queue: String,
    pub exchange: String,
    pub routing_key: String,
    pub delivery_tag: u64,
    pub correlation_id: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub redelivered: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::messaging::in_memory::RecordingAcknowledger;

    #[test]
    fn test_envelope_from_complete_delivery() {
        let delivery = Delivery::new("submittaskcommand", 7, b"{}".to_vec(), RecordingAcknowledger::new())
            .with_correlation_id("c-1")
            .redelivered(true);
        let envelope = delivery.envelope().unwrap();
        assert_eq!(envelope.routing_key, "submittaskcommand");
        assert_eq!(envelope.delivery_tag, 7);
        assert_eq!(envelope.correlation_id.as_deref(), Some("c-1"));
        assert!(envelope.redelivered);
    }

    #[test]
    fn test_missing_metadata_is_malformed() {
        let mut delivery = Delivery::new("q", 1, Vec::new(), RecordingAcknowledger::new());
        delivery.routing_key = None;
        assert!(matches!(delivery.envelope(), Err(IntakeError::MalformedEnvelope(_))));

        let mut delivery = Delivery::new("q", 1, Vec::new(), RecordingAcknowledger::new());
        delivery.delivery_tag = None;
        assert!(matches!(delivery.envelope(), Err(IntakeError::MalformedEnvelope(_))));
    }
}
