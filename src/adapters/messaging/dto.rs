//! Wire shapes for inbound commands and outbound results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::{iso_duration, Evaluation, EngineOption, DynamicPv, Score, Variation};
use crate::services::analysis_events::FinalEvaluation;

fn default_engine_id() -> String {
    "stockfish".to_string()
}

/// Task submission payload (`submittaskcommand` queues).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTaskCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pgn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fen: Option<String>,
    pub initial_pv: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    /// ISO-8601 duration, e.g. `PT30S`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<String>,
    #[serde(default)]
    pub options: Vec<EngineOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_pv: Option<DynamicPv>,
    #[serde(default = "default_engine_id")]
    pub engine_id: String,
    #[serde(default)]
    pub use_syzygy_path: bool,
}

/// Static evaluation request payload (`staticevaluationrequest` queue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticEvaluationRequest {
    pub fen: String,
}

/// Static evaluation result (`staticevaluation` exchange).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticEvaluationMessage {
    pub request: StaticEvaluationRequest,
    pub evaluation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationDto {
    pub pv_id: u32,
    pub moves: String,
    pub score: String,
    pub score_centipawns: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mate: Option<i32>,
    pub depth: u32,
    pub time_ms: u64,
}

impl From<&Variation> for VariationDto {
    fn from(variation: &Variation) -> Self {
        let (score_centipawns, mate) = match variation.score {
            Score::Centipawns(cp) => (cp, None),
            Score::Mate(n) => (variation.score.value(), Some(n)),
        };
        Self {
            pv_id: variation.pv_id,
            moves: variation.moves.clone(),
            score: variation.score.to_string(),
            score_centipawns,
            mate,
            depth: variation.depth,
            time_ms: u64::try_from(variation.time.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UciStateDto {
    pub kilo_nodes: u64,
    pub kilo_nodes_per_second: u64,
    pub tb_hits: u64,
    pub info_strings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationDto {
    pub created: DateTime<Utc>,
    pub variations: Vec<VariationDto>,
    pub uci_state: UciStateDto,
}

impl From<&Evaluation> for EvaluationDto {
    fn from(evaluation: &Evaluation) -> Self {
        let mut variations: Vec<VariationDto> = evaluation.variations.iter().map(VariationDto::from).collect();
        variations.sort_by_key(|v| v.pv_id);
        Self {
            created: evaluation.created,
            variations,
            uci_state: UciStateDto {
                kilo_nodes: evaluation.uci_state.kilo_nodes,
                kilo_nodes_per_second: evaluation.uci_state.kilo_nodes_per_second,
                tb_hits: evaluation.uci_state.tb_hits,
                info_strings: evaluation.uci_state.info_strings.iter().cloned().collect(),
            },
        }
    }
}

/// Final evaluation summary (`evaluation` exchange).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationMessage {
    pub task_id: String,
    pub task_name: Option<String>,
    pub reference: Option<String>,
    pub analysed_pgn: String,
    pub analysed_fen: String,
    pub analysed_ply: u32,
    pub engine_name: String,
    pub requested_depth: Option<u32>,
    pub requested_duration: Option<String>,
    pub hostname: Option<String>,
    pub status: String,
    pub evaluation: EvaluationDto,
    pub task_created: DateTime<Utc>,
    pub task_started: Option<DateTime<Utc>>,
    pub task_finished: Option<DateTime<Utc>>,
    pub estimated_completion_time: Option<DateTime<Utc>>,
    pub last_events: Vec<String>,
    pub history_log: String,
}

impl From<&FinalEvaluation> for EvaluationMessage {
    fn from(final_evaluation: &FinalEvaluation) -> Self {
        let run = &final_evaluation.run;
        let journal = &final_evaluation.journal;
        Self {
            task_id: run.task_id.to_string(),
            task_name: run.name.clone(),
            reference: run.reference.clone(),
            analysed_pgn: run.starting_position.pgn.clone(),
            analysed_fen: run.starting_position.fen.clone(),
            analysed_ply: run.starting_position.last_ply,
            engine_name: run
                .uci_engine_name
                .clone()
                .unwrap_or_else(|| run.engine_program_name.clone()),
            requested_depth: run.max_depth(),
            requested_duration: run.max_duration().map(iso_duration::format),
            hostname: run.hostname.clone(),
            status: final_evaluation.status.as_str().to_string(),
            evaluation: EvaluationDto::from(&final_evaluation.evaluation),
            task_created: journal.created,
            task_started: journal.started,
            task_finished: journal.finished,
            estimated_completion_time: run.estimated_completion_time(),
            last_events: journal.recent_events.iter().cloned().collect(),
            history_log: journal.history_log(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_command_defaults() {
        let command: SubmitTaskCommand =
            serde_json::from_str(r#"{"fen": "8/8/8/8/8/8/8/K1k5 w - - 0 1", "initialPv": 2, "maxDepth": 20}"#)
                .unwrap();
        assert_eq!(command.engine_id, "stockfish");
        assert!(!command.use_syzygy_path);
        assert!(command.options.is_empty());
        assert_eq!(command.initial_pv, Some(2));
    }

    #[test]
    fn test_submit_command_full_shape() {
        let command: SubmitTaskCommand = serde_json::from_str(
            r#"{
                "id": "abc",
                "pgn": "1. e4",
                "initialPv": 3,
                "maxDuration": "PT30S",
                "options": [{"name": "Threads", "value": "4"}],
                "dynamicPv": {"requiredDepth": 20, "cutOffCentiPawns": 30, "keepMinPv": 1},
                "engineId": "lc0",
                "useSyzygyPath": true
            }"#,
        )
        .unwrap();
        assert_eq!(command.id.as_deref(), Some("abc"));
        assert_eq!(command.max_duration.as_deref(), Some("PT30S"));
        assert_eq!(command.options, vec![EngineOption::new("Threads", "4")]);
        assert_eq!(command.dynamic_pv.unwrap().keep_min_pv, 1);
        assert_eq!(command.engine_id, "lc0");
        assert!(command.use_syzygy_path);
    }

    #[test]
    fn test_mate_variation_dto() {
        let variation = Variation {
            pv_id: 1,
            moves: "Qh5#".to_string(),
            score: Score::Mate(1),
            depth: 5,
            time: std::time::Duration::from_millis(12),
            position: crate::domain::models::Position::new("", "fen", 0, true),
        };
        let dto = VariationDto::from(&variation);
        assert_eq!(dto.score, "#1");
        assert_eq!(dto.mate, Some(1));
        assert_eq!(dto.time_ms, 12);
    }
}
