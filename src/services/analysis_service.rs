//! Analysis orchestration.
//!
//! Takes a validated [`AnalysisRun`], rejects duplicates, serialises runs onto
//! the single engine, folds the streamed observations into evaluation
//! snapshots and raises the final evaluation when the engine stops.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::adapters::cache::{EvaluationCache, ObservationCache, TaskCache};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AnalysisRun, CacheConfig, EngineObservation, Evaluation, RunJournal, RunStatus, Score, TaskId,
    UciState, Variation,
};
use crate::domain::ports::{EngineDriver, StopHandle};

use super::analysis_events::{AnalysisEvent, AnalysisEvents, FinalEvaluation};
use super::convergence;
use super::engine_lock::EngineLock;

/// Buffer between the engine driver and the observation folder.
const OBSERVATION_BUFFER: usize = 512;

/// The three shared caches.
#[derive(Clone, Default)]
pub struct Caches {
    pub tasks: Arc<TaskCache>,
    pub evaluations: Arc<EvaluationCache>,
    pub observations: Arc<ObservationCache>,
}

impl Caches {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            tasks: Arc::new(TaskCache::with_capacity(config.task_capacity)),
            evaluations: Arc::new(EvaluationCache::with_capacity(config.evaluation_capacity)),
            observations: Arc::new(ObservationCache::with_capacity(config.observation_capacity)),
        }
    }
}

/// Per-run state while observations stream in.
struct RunProgress {
    last_saved_depth: u32,
    early_stop_requested: bool,
    journal: RunJournal,
}

pub struct AnalysisService {
    caches: Caches,
    engine: Arc<dyn EngineDriver>,
    lock: EngineLock,
    events: AnalysisEvents,
    wait_when_busy: bool,
}

impl AnalysisService {
    pub fn new(caches: Caches, engine: Arc<dyn EngineDriver>, lock: EngineLock, events: AnalysisEvents) -> Self {
        Self {
            caches,
            engine,
            lock,
            events,
            wait_when_busy: true,
        }
    }

    /// Choose between waiting for a busy engine and failing with `EngineBusy`.
    pub fn with_wait_when_busy(mut self, wait: bool) -> Self {
        self.wait_when_busy = wait;
        self
    }

    pub fn caches(&self) -> &Caches {
        &self.caches
    }

    pub fn engine_lock(&self) -> &EngineLock {
        &self.lock
    }

    /// Run an analysis to completion.
    ///
    /// Returns `Ok(None)` when the engine is not available, so no task was
    /// started. Duplicates of a cached run fail with `DuplicateTask`.
    pub async fn submit(&self, run: AnalysisRun) -> DomainResult<Option<TaskId>> {
        let task_id = run.task_id.clone();

        if !self.engine.is_available().await {
            tracing::warn!(task_id = %task_id, engine = self.engine.name(), "engine not available");
            return Ok(None);
        }

        if self.caches.tasks.has_duplicate(&run).await {
            tracing::info!(task_id = %task_id, "identical analysis already cached, submission rejected");
            return Err(DomainError::DuplicateTask(task_id));
        }

        let lease = if self.wait_when_busy {
            self.lock.acquire(&task_id).await
        } else {
            self.lock.try_acquire(&task_id).ok_or(DomainError::EngineBusy)?
        };

        // A concurrent duplicate may have been saved while we waited for the engine.
        if let Err(existing) = self.caches.tasks.save_if_unique(run.clone()).await {
            tracing::info!(task_id = %task_id, existing = %existing, "duplicate detected after engine wait");
            return Err(DomainError::DuplicateTask(task_id));
        }

        let outcome = self.execute(&run).await;
        lease.release();
        outcome.map(|()| Some(task_id))
    }

    async fn execute(&self, run: &AnalysisRun) -> DomainResult<()> {
        let task_id = run.task_id.clone();
        let mut progress = RunProgress {
            last_saved_depth: 0,
            early_stop_requested: false,
            journal: RunJournal::new(run.created),
        };
        progress.journal.mark_started();
        if let Some(eta) = run.estimated_completion_time() {
            progress.journal.record(format!("estimated completion {}", eta.to_rfc3339()));
        }
        self.events
            .raise(AnalysisEvent::TaskStarted {
                task_id: task_id.clone(),
                at: Utc::now(),
            })
            .await;

        let stop = StopHandle::new();
        let (sender, mut receiver) = mpsc::channel(OBSERVATION_BUFFER);
        let driver = self.engine.run(run, sender, stop.clone());
        let fold = async {
            while let Some(observation) = receiver.recv().await {
                self.observe(run, observation, &mut progress, &stop).await;
            }
        };
        let (result, ()) = tokio::join!(driver, fold);

        let status = match &result {
            Ok(()) => RunStatus::Finished,
            Err(err) => {
                tracing::error!(task_id = %task_id, error = %err, "engine run failed");
                progress.journal.record(format!("engine failed: {err}"));
                RunStatus::Failed
            }
        };
        progress.journal.mark_finished(status);

        match self.final_evaluation(run).await {
            Some(evaluation) => {
                self.events
                    .raise(AnalysisEvent::FinalEvaluationReady(Box::new(FinalEvaluation {
                        run: run.clone(),
                        evaluation,
                        status,
                        journal: progress.journal,
                    })))
                    .await;
            }
            None => tracing::warn!(task_id = %task_id, "engine produced no evaluation"),
        }

        result
    }

    /// Cache one observation and re-check convergence.
    async fn observe(
        &self,
        run: &AnalysisRun,
        observation: EngineObservation,
        progress: &mut RunProgress,
        stop: &StopHandle,
    ) {
        let complete = observation.has_game();
        self.caches.observations.save(observation).await;
        if !complete {
            return;
        }

        let Some(evaluation) = self.current_evaluation(run).await else {
            return;
        };
        let depth = evaluation.max_depth();

        if depth > progress.last_saved_depth && convergence::is_stable_snapshot(&evaluation, run.initial_pv) {
            progress.last_saved_depth = depth;
            progress.journal.add_history(history_line(&evaluation));
            progress.journal.record(format!("snapshot saved at depth {depth}"));
            self.caches.evaluations.save(evaluation.clone()).await;
            self.events
                .raise(AnalysisEvent::EvaluationSaved {
                    task_id: run.task_id.clone(),
                    depth,
                })
                .await;
        }

        if let Some(policy) = run.dynamic_pv {
            if !progress.early_stop_requested && convergence::should_stop_early(&evaluation, &policy) {
                progress.early_stop_requested = true;
                progress.journal.record(format!("early stop requested at depth {depth}"));
                stop.request_stop();
                self.events
                    .raise(AnalysisEvent::EarlyStopRequested {
                        task_id: run.task_id.clone(),
                        depth,
                    })
                    .await;
            }
        }
    }

    /// Build an evaluation from the current state of every principal variation.
    pub async fn current_evaluation(&self, run: &AnalysisRun) -> Option<Evaluation> {
        let lines = self
            .caches
            .observations
            .find_by_task_id_grouped_by_multi_pv_max_depth_and_occurred_on(&run.task_id)
            .await;
        if lines.is_empty() {
            return None;
        }
        let heartbeat = self
            .caches
            .observations
            .find_by_task_id_max_occurred_on(&run.task_id)
            .await;

        let variations = lines.iter().map(|line| to_variation(run, line)).collect();
        let uci_state = heartbeat.as_ref().map(uci_state).unwrap_or_default();

        Some(Evaluation {
            task_id: run.task_id.clone(),
            created: Utc::now(),
            variations,
            uci_state,
        })
    }

    /// The freshest evaluation at the end of a run, saved before it is returned.
    async fn final_evaluation(&self, run: &AnalysisRun) -> Option<Evaluation> {
        if let Some(evaluation) = self.current_evaluation(run).await {
            self.caches.evaluations.save(evaluation.clone()).await;
            return Some(evaluation);
        }
        self.caches
            .evaluations
            .find_by_task_id_max_created(&run.task_id)
            .await
    }
}

fn to_variation(run: &AnalysisRun, observation: &EngineObservation) -> Variation {
    Variation {
        pv_id: observation.multi_pv,
        moves: observation.line_san.clone().unwrap_or_default(),
        score: observation
            .mate
            .map_or(Score::Centipawns(observation.score), Score::Mate),
        depth: observation.depth,
        time: Duration::from_millis(observation.time_ms),
        position: run.starting_position.clone(),
    }
}

fn uci_state(observation: &EngineObservation) -> UciState {
    UciState {
        kilo_nodes: observation.kilo_nodes(),
        kilo_nodes_per_second: observation.kilo_nodes_per_second(),
        tb_hits: observation.tb_hits,
        info_strings: observation.info_strings.clone(),
    }
}

fn history_line(evaluation: &Evaluation) -> String {
    let best = evaluation
        .best_variation()
        .map(|line| format!("{} {}", line.score, line.moves))
        .unwrap_or_default();
    format!(
        "{} depth {}: {}",
        evaluation.created.format("%H:%M:%S"),
        evaluation.max_depth(),
        best.trim_end()
    )
}
