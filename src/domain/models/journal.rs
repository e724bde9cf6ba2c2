//! Lifecycle record kept while a run executes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of recent events carried on the final message.
pub const RECENT_EVENT_LIMIT: usize = 20;

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Finished,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finished => "FINISHED",
            Self::Failed => "FAILED",
        }
    }
}

/// Timestamps, a bounded event log and a free-text history for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunJournal {
    pub created: DateTime<Utc>,
    pub started: Option<DateTime<Utc>>,
    pub finished: Option<DateTime<Utc>>,
    pub recent_events: VecDeque<String>,
    pub history: Vec<String>,
}

impl RunJournal {
    pub fn new(created: DateTime<Utc>) -> Self {
        Self {
            created,
            started: None,
            finished: None,
            recent_events: VecDeque::with_capacity(RECENT_EVENT_LIMIT),
            history: Vec::new(),
        }
    }

    pub fn mark_started(&mut self) {
        self.started = Some(Utc::now());
        self.record("analysis started");
    }

    pub fn mark_finished(&mut self, status: RunStatus) {
        self.finished = Some(Utc::now());
        self.record(format!("analysis {}", status.as_str().to_lowercase()));
    }

    /// Append a timestamped event, dropping the oldest beyond the limit.
    pub fn record(&mut self, event: impl Into<String>) {
        if self.recent_events.len() == RECENT_EVENT_LIMIT {
            self.recent_events.pop_front();
        }
        self.recent_events
            .push_back(format!("{} {}", Utc::now().format("%H:%M:%S%.3f"), event.into()));
    }

    pub fn add_history(&mut self, line: impl Into<String>) {
        self.history.push(line.into());
    }

    /// History as one newline-separated block.
    pub fn history_log(&self) -> String {
        self.history.join("\n")
    }
}
