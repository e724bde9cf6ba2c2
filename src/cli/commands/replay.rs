//! Implementation of the `kibitzer replay` command.
//!
//! Feeds recorded deliveries through the intake router, with a scripted
//! engine and the in-memory broker standing in for the real ones.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::adapters::engine::ScriptedEngine;
use crate::adapters::messaging::{AckDecision, Delivery, InMemoryBroker, PublishBehavior, RecordingAcknowledger};
use crate::adapters::notation::MovetextNotation;
use crate::application::{fallback_sinks_from_config, Collaborators, Pipeline};
use crate::cli::load_config;
use crate::cli::output::{output, CommandOutput};

/// One line of a replay file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedDelivery {
    pub queue: String,
    #[serde(default)]
    pub redelivered: bool,
    #[serde(default)]
    pub correlation_id: Option<String>,
    /// JSON payload; a string is sent verbatim.
    pub body: serde_json::Value,
}

impl RecordedDelivery {
    fn payload(&self) -> Result<Vec<u8>> {
        match &self.body {
            serde_json::Value::String(raw) => Ok(raw.as_bytes().to_vec()),
            other => serde_json::to_vec(other).context("Failed to encode body"),
        }
    }
}

/// Options of a replay run.
#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    pub multi_pv: u32,
    pub depth: u32,
    pub nack: bool,
    pub no_delay: bool,
}

#[derive(Debug, Serialize)]
pub struct ReplayLine {
    pub line: usize,
    pub queue: String,
    pub decision: String,
}

#[derive(Debug, Serialize)]
pub struct ReplayOutput {
    pub deliveries: Vec<ReplayLine>,
    pub published: usize,
    pub fallback_dir: String,
}

impl CommandOutput for ReplayOutput {
    fn to_human(&self) -> String {
        let mut lines: Vec<String> = self
            .deliveries
            .iter()
            .map(|d| format!("{:>4}  {:<28} {}", d.line, d.queue, d.decision))
            .collect();
        lines.push(format!("\n{} message(s) accepted by the broker", self.published));
        lines.push(format!("fallback directory: {}", self.fallback_dir));
        lines.join("\n")
    }
}

fn describe(decision: AckDecision) -> String {
    match decision {
        AckDecision::Ack => "ack".to_string(),
        AckDecision::Nack { requeue: true } => "nack (requeue)".to_string(),
        AckDecision::Nack { requeue: false } => "nack".to_string(),
    }
}

/// Parse a JSON-lines replay file, skipping blank lines.
pub fn parse_recording(text: &str) -> Result<Vec<(usize, RecordedDelivery)>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .map(|delivery| (index + 1, delivery))
                .with_context(|| format!("line {} is not a recorded delivery", index + 1))
        })
        .collect()
}

pub async fn execute(file: &Path, options: ReplayOptions, config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let mut config = load_config(config_path).context("Failed to load configuration")?;
    if options.no_delay {
        config.intake.submit_delay_ms = 0;
    }

    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let recording = parse_recording(&text)?;

    let engine = Arc::new(ScriptedEngine::converging("stockfish", options.multi_pv, options.depth));
    let behavior = if options.nack {
        PublishBehavior::Nack
    } else {
        PublishBehavior::Ack
    };
    let broker = Arc::new(InMemoryBroker::with_behavior(behavior));
    let pipeline = Pipeline::build(
        &config,
        Collaborators {
            engine: engine.clone(),
            evaluator: engine,
            broker: broker.clone(),
            notation: Arc::new(MovetextNotation::new()),
            fallback_sinks: fallback_sinks_from_config(&config.publishing)?,
        },
    );

    let mut deliveries = Vec::with_capacity(recording.len());
    for (tag, (line, recorded)) in recording.into_iter().enumerate() {
        let acker = RecordingAcknowledger::new();
        let mut delivery = Delivery::new(recorded.queue.clone(), tag as u64 + 1, recorded.payload()?, acker)
            .redelivered(recorded.redelivered);
        delivery.correlation_id = recorded.correlation_id.clone();

        let decision = pipeline.dispatch(delivery).await;
        deliveries.push(ReplayLine {
            line,
            queue: recorded.queue,
            decision: describe(decision),
        });
    }

    pipeline.shutdown().await;

    output(
        &ReplayOutput {
            deliveries,
            published: broker.published().await.len(),
            fallback_dir: config.publishing.fallback_dir.display().to_string(),
        },
        json_mode,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recording() {
        let text = r#"{"queue":"submittaskcommand","body":{"fen":"f","initialPv":1,"maxDepth":3}}

{"queue":"staticevaluationrequest","redelivered":true,"body":"{\"fen\":\"f\"}"}"#;
        let parsed = parse_recording(text).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].0, 1);
        assert_eq!(parsed[1].0, 3);
        assert!(parsed[1].1.redelivered);
        assert_eq!(parsed[1].1.payload().unwrap(), br#"{"fen":"f"}"#);
    }

    #[test]
    fn test_parse_recording_reports_line() {
        let err = parse_recording("{\"queue\":\"q\",\"body\":{}}\nnope").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
