//! Evaluation snapshots and the principal variations they contain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

use super::position::Position;
use super::score::Score;
use super::task_id::TaskId;

/// One principal-variation line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variation {
    pub pv_id: u32,
    pub moves: String,
    pub score: Score,
    pub depth: u32,
    pub time: Duration,
    /// The analysed position the line starts from.
    pub position: Position,
}

/// Engine counters captured alongside a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UciState {
    pub kilo_nodes: u64,
    pub kilo_nodes_per_second: u64,
    pub tb_hits: u64,
    pub info_strings: BTreeSet<String>,
}

/// A saved snapshot of analysis progress for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub task_id: TaskId,
    pub created: DateTime<Utc>,
    pub variations: Vec<Variation>,
    pub uci_state: UciState,
}

impl Evaluation {
    /// Deepest depth among the variations, 0 when there are none.
    pub fn max_depth(&self) -> u32 {
        self.variations.iter().map(|v| v.depth).max().unwrap_or(0)
    }

    /// The variation with the lowest PV id, i.e. the engine's preferred line.
    pub fn best_variation(&self) -> Option<&Variation> {
        self.variations.iter().min_by_key(|v| v.pv_id)
    }
}
