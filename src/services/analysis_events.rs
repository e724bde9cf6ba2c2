//! In-process events raised by the analysis pipeline.
//!
//! Events travel over an explicit mpsc channel to a fixed set of listeners:
//! lifecycle events are logged, a final evaluation is handed to the result
//! publisher. There is no general subscription mechanism.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::models::{AnalysisRun, Evaluation, RunJournal, RunStatus, TaskId};

use super::result_publisher::ResultPublisher;

/// Channel capacity for pipeline events.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Everything the publisher needs to describe a finished run.
#[derive(Debug, Clone)]
pub struct FinalEvaluation {
    pub run: AnalysisRun,
    pub evaluation: Evaluation,
    pub status: RunStatus,
    pub journal: RunJournal,
}

/// Pipeline events.
#[derive(Debug, Clone)]
pub enum AnalysisEvent {
    TaskStarted {
        task_id: TaskId,
        at: DateTime<Utc>,
    },
    EvaluationSaved {
        task_id: TaskId,
        depth: u32,
    },
    EarlyStopRequested {
        task_id: TaskId,
        depth: u32,
    },
    FinalEvaluationReady(Box<FinalEvaluation>),
}

impl AnalysisEvent {
    pub fn task_id(&self) -> &TaskId {
        match self {
            Self::TaskStarted { task_id, .. }
            | Self::EvaluationSaved { task_id, .. }
            | Self::EarlyStopRequested { task_id, .. } => task_id,
            Self::FinalEvaluationReady(final_evaluation) => &final_evaluation.run.task_id,
        }
    }
}

/// Sending half handed to the analysis service.
#[derive(Debug, Clone)]
pub struct AnalysisEvents {
    sender: mpsc::Sender<AnalysisEvent>,
}

impl AnalysisEvents {
    /// Create the channel. The receiver goes to [`spawn_event_listeners`].
    pub fn channel() -> (Self, mpsc::Receiver<AnalysisEvent>) {
        let (sender, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        (Self { sender }, receiver)
    }

    /// Raise an event. A closed channel is logged, never fatal.
    pub async fn raise(&self, event: AnalysisEvent) {
        let task_id = event.task_id().clone();
        if self.sender.send(event).await.is_err() {
            tracing::warn!(task_id = %task_id, "event listeners gone, event dropped");
        }
    }
}

/// Route events to their listeners until every sender is dropped.
pub fn spawn_event_listeners(
    mut receiver: mpsc::Receiver<AnalysisEvent>,
    publisher: Arc<ResultPublisher>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            match event {
                AnalysisEvent::TaskStarted { task_id, at } => {
                    tracing::info!(task_id = %task_id, started = %at, "analysis started");
                }
                AnalysisEvent::EvaluationSaved { task_id, depth } => {
                    tracing::debug!(task_id = %task_id, depth, "evaluation snapshot saved");
                }
                AnalysisEvent::EarlyStopRequested { task_id, depth } => {
                    tracing::info!(task_id = %task_id, depth, "dynamic pv policy requested early stop");
                }
                AnalysisEvent::FinalEvaluationReady(final_evaluation) => {
                    let task_id = final_evaluation.run.task_id.clone();
                    let outcome = publisher.publish_final(&final_evaluation).await.outcome().await;
                    tracing::info!(task_id = %task_id, ?outcome, "final evaluation settled");
                }
            }
        }
        tracing::debug!("event channel closed, listeners stopped");
    })
}
