//! Raw engine output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::task_id::TaskId;

/// One update line emitted by the engine for one principal variation.
///
/// Observations are plain values: two identical updates are the same
/// observation, which is what lets the observation cache act as a set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineObservation {
    pub task_id: TaskId,
    pub multi_pv: u32,
    pub depth: u32,
    pub time_ms: u64,
    /// Centipawns from White's perspective.
    pub score: i32,
    /// Mate distance when the engine reports a forced mate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mate: Option<i32>,
    pub nodes: u64,
    pub nodes_per_second: u64,
    pub tb_hits: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pgn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_san: Option<String>,
    pub calculated_plies: u32,
    pub occurred_on: DateTime<Utc>,
    #[serde(default)]
    pub info_strings: BTreeSet<String>,
}

impl EngineObservation {
    pub fn kilo_nodes(&self) -> u64 {
        self.nodes / 1000
    }

    pub fn kilo_nodes_per_second(&self) -> u64 {
        self.nodes_per_second / 1000
    }

    /// True when the observation carries a complete game text.
    pub fn has_game(&self) -> bool {
        self.pgn.as_deref().is_some_and(|pgn| !pgn.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(nodes: u64, nps: u64, pgn: Option<&str>) -> EngineObservation {
        EngineObservation {
            task_id: TaskId::new("t"),
            multi_pv: 1,
            depth: 10,
            time_ms: 100,
            score: 20,
            mate: None,
            nodes,
            nodes_per_second: nps,
            tb_hits: 0,
            pgn: pgn.map(str::to_string),
            line_san: None,
            calculated_plies: 10,
            occurred_on: Utc::now(),
            info_strings: BTreeSet::new(),
        }
    }

    #[test]
    fn test_kilo_counters_truncate() {
        let obs = observation(12_999, 1_500_999, None);
        assert_eq!(obs.kilo_nodes(), 12);
        assert_eq!(obs.kilo_nodes_per_second(), 1500);
    }

    #[test]
    fn test_has_game() {
        assert!(!observation(0, 0, None).has_game());
        assert!(!observation(0, 0, Some("")).has_game());
        assert!(observation(0, 0, Some("1. e4 e5")).has_game());
    }
}
