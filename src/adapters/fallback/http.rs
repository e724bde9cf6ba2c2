//! HTTP fallback sink: POSTs the unpublished payload to a configured URL.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::FallbackSink;

pub struct HttpFallbackSink {
    client: Client,
    url: String,
}

impl HttpFallbackSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| DomainError::Broker(format!("cannot build fallback HTTP client: {err}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FallbackSink for HttpFallbackSink {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn deliver(&self, exchange: &str, payload: &[u8]) {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header("x-exchange", exchange)
            .body(payload.to_vec())
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                tracing::info!(exchange, url = %self.url, status = response.status().as_u16(), "payload posted to fallback endpoint");
            }
            Ok(response) => {
                tracing::warn!(exchange, url = %self.url, status = response.status().as_u16(), "fallback endpoint rejected payload");
            }
            Err(err) => {
                tracing::error!(exchange, url = %self.url, error = %err, "fallback POST failed");
            }
        }
    }
}
