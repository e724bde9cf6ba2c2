//! Engine driver port - interface to the UCI subprocess.
//!
//! The driver owns the engine process: it starts it with the run's options,
//! streams every `info` line back as an [`EngineObservation`], enforces the
//! depth or duration ceiling, and polls the [`StopHandle`] so a converged
//! analysis can be cut short.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AnalysisRun, EngineObservation};

/// Shared "stop now" predicate polled by the engine driver.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn should_stop(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Trait for engine driver implementations.
#[async_trait]
pub trait EngineDriver: Send + Sync {
    /// Engine program name, e.g. `stockfish`.
    fn name(&self) -> &str;

    /// Check whether the engine process can be started.
    async fn is_available(&self) -> bool;

    /// Run the analysis to completion.
    ///
    /// Observations are sent on `observations` as they arrive; the sender is
    /// dropped when the run ends. Returns once the engine has stopped.
    async fn run(
        &self,
        run: &AnalysisRun,
        observations: mpsc::Sender<EngineObservation>,
        stop: StopHandle,
    ) -> DomainResult<()>;

    /// Ask the engine to stop searching gracefully.
    async fn stop(&self) -> DomainResult<()>;

    /// Kill the engine process.
    async fn kill(&self) -> DomainResult<()>;
}

/// One-shot static evaluation (`eval` command) of a position.
#[async_trait]
pub trait StaticEvaluator: Send + Sync {
    async fn evaluate(&self, fen: &str) -> DomainResult<String>;
}
