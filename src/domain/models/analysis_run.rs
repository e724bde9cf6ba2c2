//! Analysis run domain model.
//!
//! An `AnalysisRun` is one requested analysis of a chess position. Runs are
//! never mutated in place: option changes produce a new value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::position::Position;
use super::task_id::TaskId;

/// A named UCI engine option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineOption {
    pub name: String,
    pub value: String,
}

impl EngineOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Early-termination policy: stop once few enough lines stay near the best one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicPv {
    pub required_depth: u32,
    pub cut_off_centi_pawns: i32,
    pub keep_min_pv: u32,
}

/// The single ceiling an analysis runs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisLimit {
    Depth(u32),
    Duration(Duration),
}

/// A requested analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub task_id: TaskId,
    pub name: Option<String>,
    pub reference: Option<String>,
    pub engine_program_name: String,
    pub uci_engine_name: Option<String>,
    pub hostname: Option<String>,
    pub starting_position: Position,
    pub initial_pv: u32,
    pub limit: AnalysisLimit,
    pub engine_options: Vec<EngineOption>,
    pub use_syzygy_path: bool,
    pub dynamic_pv: Option<DynamicPv>,
    pub created: DateTime<Utc>,
}

impl AnalysisRun {
    pub fn max_depth(&self) -> Option<u32> {
        match self.limit {
            AnalysisLimit::Depth(depth) => Some(depth),
            AnalysisLimit::Duration(_) => None,
        }
    }

    pub fn max_duration(&self) -> Option<Duration> {
        match self.limit {
            AnalysisLimit::Duration(duration) => Some(duration),
            AnalysisLimit::Depth(_) => None,
        }
    }

    /// `created + maxDuration` for duration-bounded runs.
    pub fn estimated_completion_time(&self) -> Option<DateTime<Utc>> {
        let duration = chrono::Duration::from_std(self.max_duration()?).ok()?;
        self.created.checked_add_signed(duration)
    }

    /// Return a copy whose options are merged by name with `option` winning.
    pub fn add_or_replace_option(&self, option: EngineOption) -> Self {
        let mut engine_options: Vec<EngineOption> = self
            .engine_options
            .iter()
            .filter(|existing| existing.name != option.name)
            .cloned()
            .collect();
        engine_options.push(option);

        Self {
            engine_options,
            ..self.clone()
        }
    }

    /// Structural equality used to spot a resubmitted request.
    ///
    /// Ignores `task_id`, `uci_engine_name`, `hostname` and `created`.
    /// Option order is not significant.
    pub fn is_same_as(&self, other: &AnalysisRun) -> bool {
        self.name == other.name
            && self.engine_program_name == other.engine_program_name
            && self.starting_position.notation() == other.starting_position.notation()
            && self.starting_position.last_ply == other.starting_position.last_ply
            && self.initial_pv == other.initial_pv
            && self.limit == other.limit
            && same_options(&self.engine_options, &other.engine_options)
            && self.use_syzygy_path == other.use_syzygy_path
            && self.dynamic_pv == other.dynamic_pv
    }
}

fn same_options(left: &[EngineOption], right: &[EngineOption]) -> bool {
    let mut left: Vec<&EngineOption> = left.iter().collect();
    let mut right: Vec<&EngineOption> = right.iter().collect();
    left.sort_by(|a, b| a.name.cmp(&b.name));
    right.sort_by(|a, b| a.name.cmp(&b.name));
    left == right
}
