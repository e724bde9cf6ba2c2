//! Fallback sink port - best-effort delivery of payloads the broker rejected.

use async_trait::async_trait;

/// A best-effort destination for an unpublished payload.
///
/// Implementations log and swallow their own failures: a fallback never
/// triggers another fallback and never fails the caller.
#[async_trait]
pub trait FallbackSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, exchange: &str, payload: &[u8]);
}
