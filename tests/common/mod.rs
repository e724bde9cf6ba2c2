//! Common test utilities for integration tests
//!
//! Provides a fully wired pipeline around a scripted engine, the in-memory
//! broker and a recording fallback sink.

use std::sync::Arc;

use chrono::Utc;
use kibitzer::adapters::engine::ScriptedEngine;
use kibitzer::adapters::messaging::{InMemoryBroker, PublishBehavior, RecordingSink};
use kibitzer::adapters::notation::MovetextNotation;
use kibitzer::application::{Collaborators, Pipeline};
use kibitzer::domain::models::{AnalysisLimit, AnalysisRun, Config, Position, TaskId};
use tempfile::TempDir;

/// FEN with White to move used by most scenarios.
pub const WHITE_FEN: &str = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";

/// Setup test logging
#[allow(dead_code)]
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Configuration with no submission delay and a throwaway fallback directory.
pub fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.intake.submit_delay_ms = 0;
    config.publishing.fallback_dir = dir.path().join("unpublished");
    config
}

/// A submission payload for `WHITE_FEN`.
#[allow(dead_code)]
pub fn fen_submission(id: Option<&str>, depth: u32, initial_pv: u32) -> Vec<u8> {
    let mut body = serde_json::json!({
        "fen": WHITE_FEN,
        "initialPv": initial_pv,
        "maxDepth": depth,
    });
    if let Some(id) = id {
        body["id"] = serde_json::Value::String(id.to_string());
    }
    serde_json::to_vec(&body).unwrap()
}

/// A run built directly, bypassing intake.
#[allow(dead_code)]
pub fn depth_run(id: &str, depth: u32, initial_pv: u32) -> AnalysisRun {
    AnalysisRun {
        task_id: TaskId::new(id),
        name: None,
        reference: None,
        engine_program_name: "stockfish".to_string(),
        uci_engine_name: None,
        hostname: None,
        starting_position: Position::new("", WHITE_FEN, 4, true),
        initial_pv,
        limit: AnalysisLimit::Depth(depth),
        engine_options: Vec::new(),
        use_syzygy_path: false,
        dynamic_pv: None,
        created: Utc::now(),
    }
}

pub struct Harness {
    pub pipeline: Pipeline,
    pub broker: Arc<InMemoryBroker>,
    pub engine: Arc<ScriptedEngine>,
    pub sink: Arc<RecordingSink>,
    pub config: Config,
    _dir: TempDir,
}

impl Harness {
    pub fn new(engine: ScriptedEngine, behavior: PublishBehavior) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        Self::with_config(engine, behavior, test_config(&dir), dir)
    }

    pub fn with_config(engine: ScriptedEngine, behavior: PublishBehavior, config: Config, dir: TempDir) -> Self {
        let engine = Arc::new(engine);
        let broker = Arc::new(InMemoryBroker::with_behavior(behavior));
        let sink = Arc::new(RecordingSink::new("recording"));
        let pipeline = Pipeline::build(
            &config,
            Collaborators {
                engine: engine.clone(),
                evaluator: engine.clone(),
                broker: broker.clone(),
                notation: Arc::new(MovetextNotation::new()),
                fallback_sinks: vec![sink.clone()],
            },
        );
        Self {
            pipeline,
            broker,
            engine,
            sink,
            config,
            _dir: dir,
        }
    }
}

/// Poll an async condition every 20ms until it holds or `timeout_ms` passes.
#[allow(dead_code)]
pub async fn wait_for<F, Fut>(mut predicate: F, timeout_ms: u64) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);
    while tokio::time::Instant::now() < deadline {
        if predicate().await {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    predicate().await
}
