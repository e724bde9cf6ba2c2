//! Submission validation and mapping onto [`AnalysisRun`].

use chrono::Utc;
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{iso_duration, AnalysisLimit, AnalysisRun, EngineConfig, EngineOption, TaskId};
use crate::domain::ports::NotationService;

use super::dto::SubmitTaskCommand;

/// UCI option name for the tablebase directory.
pub const SYZYGY_PATH_OPTION: &str = "SyzygyPath";

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl SubmitTaskCommand {
    /// Exactly one of `maxDepth`/`maxDuration`, exactly one of `pgn`/`fen`,
    /// and a positive `initialPv`.
    pub fn validate(&self) -> DomainResult<()> {
        match self.initial_pv {
            None => return Err(DomainError::ValidationFailed("initialPv is required".to_string())),
            Some(0) => return Err(DomainError::ValidationFailed("initialPv must be at least 1".to_string())),
            Some(_) => {}
        }

        match (self.max_depth, present(self.max_duration.as_ref())) {
            (Some(_), Some(_)) => {
                return Err(DomainError::ValidationFailed(
                    "maxDepth and maxDuration are mutually exclusive".to_string(),
                ));
            }
            (None, None) => {
                return Err(DomainError::ValidationFailed(
                    "one of maxDepth or maxDuration is required".to_string(),
                ));
            }
            (None, Some(duration)) => {
                iso_duration::parse(duration)
                    .map_err(|err| DomainError::ValidationFailed(format!("maxDuration: {err}")))?;
            }
            (Some(_), None) => {}
        }

        match (present(self.pgn.as_ref()), present(self.fen.as_ref())) {
            (Some(_), Some(_)) => Err(DomainError::ValidationFailed(
                "pgn and fen are mutually exclusive".to_string(),
            )),
            (None, None) => Err(DomainError::ValidationFailed("one of pgn or fen is required".to_string())),
            _ => Ok(()),
        }
    }
}

/// Builds runs from validated submissions.
#[derive(Clone)]
pub struct SubmitTaskMapper {
    notation: Arc<dyn NotationService>,
    hostname: Option<String>,
    syzygy_path: Option<String>,
}

impl SubmitTaskMapper {
    pub fn new(notation: Arc<dyn NotationService>, engine: &EngineConfig) -> Self {
        let hostname = engine
            .hostname
            .clone()
            .or_else(|| std::env::var("HOSTNAME").ok())
            .filter(|host| !host.is_empty());
        Self {
            notation,
            hostname,
            syzygy_path: engine.syzygy_path.clone(),
        }
    }

    /// Map a submission, validating it first.
    pub fn to_run(&self, command: &SubmitTaskCommand) -> DomainResult<AnalysisRun> {
        command.validate()?;

        let starting_position = match (present(command.pgn.as_ref()), present(command.fen.as_ref())) {
            (Some(pgn), _) => self.notation.position_from_pgn(pgn)?,
            (None, Some(fen)) => self.notation.position_from_fen(fen)?,
            (None, None) => {
                return Err(DomainError::ValidationFailed("one of pgn or fen is required".to_string()));
            }
        };

        let limit = match (command.max_depth, present(command.max_duration.as_ref())) {
            (Some(depth), _) => AnalysisLimit::Depth(depth),
            (None, Some(duration)) => {
                AnalysisLimit::Duration(iso_duration::parse(duration).map_err(DomainError::ValidationFailed)?)
            }
            (None, None) => {
                return Err(DomainError::ValidationFailed(
                    "one of maxDepth or maxDuration is required".to_string(),
                ));
            }
        };

        let task_id = present(command.id.as_ref()).map_or_else(TaskId::generate, TaskId::from);

        let mut run = AnalysisRun {
            task_id,
            name: command.name.clone(),
            reference: command.reference.clone(),
            engine_program_name: command.engine_id.clone(),
            uci_engine_name: None,
            hostname: self.hostname.clone(),
            starting_position,
            initial_pv: command.initial_pv.unwrap_or(1),
            limit,
            engine_options: Vec::new(),
            use_syzygy_path: command.use_syzygy_path,
            dynamic_pv: command.dynamic_pv,
            created: Utc::now(),
        };
        for option in &command.options {
            run = run.add_or_replace_option(option.clone());
        }

        if command.use_syzygy_path {
            match &self.syzygy_path {
                Some(path) => run = run.add_or_replace_option(EngineOption::new(SYZYGY_PATH_OPTION, path)),
                None => tracing::warn!(task_id = %run.task_id, "tablebases requested but no syzygy path configured"),
            }
        }

        Ok(run)
    }
}
