//! Engine driver that plays back a fixed list of observations.
//!
//! Drives the `replay` command and the integration tests. Each played
//! observation is re-stamped with the running task id and the current time;
//! the depth ceiling and the stop handle are honoured the way a real driver
//! would.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AnalysisRun, EngineObservation, TaskId};
use crate::domain::ports::{EngineDriver, StaticEvaluator, StopHandle};

pub struct ScriptedEngine {
    name: String,
    available: bool,
    script: Vec<EngineObservation>,
    step_delay: Duration,
    failure: Option<String>,
    static_evaluation: String,
    runs: AtomicUsize,
    stops: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new(name: impl Into<String>, script: Vec<EngineObservation>) -> Self {
        Self {
            name: name.into(),
            available: true,
            script,
            step_delay: Duration::ZERO,
            failure: None,
            static_evaluation: "Final evaluation: +0.00 (white side)".to_string(),
            runs: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    /// A script where `multi_pv` lines deepen from 1 to `max_depth`, the
    /// first line keeping a clear lead over the others.
    pub fn converging(name: impl Into<String>, multi_pv: u32, max_depth: u32) -> Self {
        let mut script = Vec::new();
        for depth in 1..=max_depth {
            for pv in 1..=multi_pv {
                let spread = i32::try_from(pv.saturating_sub(1) * 60).unwrap_or(i32::MAX);
                script.push(scripted_observation(pv, depth, 40 - spread, &format!("e4 e5 Nf3 line{pv}")));
            }
        }
        Self::new(name, script)
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn with_static_evaluation(mut self, evaluation: impl Into<String>) -> Self {
        self.static_evaluation = evaluation.into();
        self
    }

    /// Number of runs started so far.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// Number of `stop`/`kill` requests received.
    pub fn stop_requests(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

/// A complete observation for `pv` at `depth`, task id left blank.
pub fn scripted_observation(pv: u32, depth: u32, score: i32, line_san: &str) -> EngineObservation {
    EngineObservation {
        task_id: TaskId::new(""),
        multi_pv: pv,
        depth,
        time_ms: u64::from(depth) * 100,
        score,
        mate: None,
        nodes: u64::from(depth) * 150_000,
        nodes_per_second: 1_500_000,
        tb_hits: 0,
        pgn: Some(line_san.to_string()),
        line_san: Some(line_san.to_string()),
        calculated_plies: depth,
        occurred_on: Utc::now(),
        info_strings: BTreeSet::new(),
    }
}

#[async_trait]
impl EngineDriver for ScriptedEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn run(
        &self,
        run: &AnalysisRun,
        observations: mpsc::Sender<EngineObservation>,
        stop: StopHandle,
    ) -> DomainResult<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let ceiling = run.max_depth().unwrap_or(u32::MAX);
        let deadline = run.max_duration().map(|limit| tokio::time::Instant::now() + limit);

        for template in &self.script {
            if stop.should_stop() {
                tracing::debug!(task_id = %run.task_id, "scripted engine stopping on request");
                break;
            }
            if template.depth > ceiling || deadline.is_some_and(|end| tokio::time::Instant::now() >= end) {
                break;
            }
            if template.multi_pv > run.initial_pv {
                continue;
            }
            if !self.step_delay.is_zero() {
                tokio::time::sleep(self.step_delay).await;
            }

            let observation = EngineObservation {
                task_id: run.task_id.clone(),
                occurred_on: Utc::now(),
                ..template.clone()
            };
            if observations.send(observation).await.is_err() {
                break;
            }
        }

        match &self.failure {
            Some(reason) => Err(DomainError::EngineFailed(reason.clone())),
            None => Ok(()),
        }
    }

    async fn stop(&self) -> DomainResult<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn kill(&self) -> DomainResult<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl StaticEvaluator for ScriptedEngine {
    async fn evaluate(&self, fen: &str) -> DomainResult<String> {
        if !self.available {
            return Err(DomainError::EngineUnavailable(self.name.clone()));
        }
        tracing::trace!(fen, "scripted static evaluation");
        Ok(self.static_evaluation.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AnalysisLimit, Position};

    fn run(depth: u32, initial_pv: u32) -> AnalysisRun {
        AnalysisRun {
            task_id: TaskId::new("scripted"),
            name: None,
            reference: None,
            engine_program_name: "stockfish".to_string(),
            uci_engine_name: None,
            hostname: None,
            starting_position: Position::new("", "fen", 0, true),
            initial_pv,
            limit: AnalysisLimit::Depth(depth),
            engine_options: Vec::new(),
            use_syzygy_path: false,
            dynamic_pv: None,
            created: Utc::now(),
        }
    }

    async fn collect(engine: &ScriptedEngine, run: &AnalysisRun, stop: StopHandle) -> Vec<EngineObservation> {
        let (sender, mut receiver) = mpsc::channel(1024);
        engine.run(run, sender, stop).await.unwrap();
        let mut seen = Vec::new();
        while let Some(observation) = receiver.recv().await {
            seen.push(observation);
        }
        seen
    }

    #[tokio::test]
    async fn test_respects_depth_ceiling_and_pv_count() {
        let engine = ScriptedEngine::converging("stockfish", 3, 10);
        let seen = collect(&engine, &run(4, 2), StopHandle::new()).await;
        assert_eq!(seen.len(), 8);
        assert!(seen.iter().all(|o| o.depth <= 4 && o.multi_pv <= 2));
        assert!(seen.iter().all(|o| o.task_id == TaskId::new("scripted")));
    }

    #[tokio::test]
    async fn test_stop_handle_ends_playback() {
        let engine = ScriptedEngine::converging("stockfish", 1, 10);
        let stop = StopHandle::new();
        stop.request_stop();
        assert!(collect(&engine, &run(10, 1), stop).await.is_empty());
        assert_eq!(engine.runs(), 1);
    }

    #[tokio::test]
    async fn test_failure_reported_after_playback() {
        let engine = ScriptedEngine::converging("stockfish", 1, 2).failing("segfault");
        let (sender, _receiver) = mpsc::channel(16);
        let result = engine.run(&run(2, 1), sender, StopHandle::new()).await;
        assert!(matches!(result, Err(DomainError::EngineFailed(_))));
    }
}
