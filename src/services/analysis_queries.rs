//! Read-side queries over the caches.
//!
//! Misses are absent results, never errors.

use chrono::{DateTime, Utc};

use crate::domain::models::{AnalysisRun, EngineObservation, Evaluation, TaskId};

use super::analysis_service::Caches;
use super::engine_lock::EngineLock;

#[derive(Clone)]
pub struct AnalysisQueries {
    caches: Caches,
    lock: EngineLock,
}

impl AnalysisQueries {
    pub fn new(caches: Caches, lock: EngineLock) -> Self {
        Self { caches, lock }
    }

    /// The most recently created run.
    pub async fn latest_task(&self) -> Option<AnalysisRun> {
        self.caches.tasks.find_latest().await
    }

    /// A run by id or id prefix.
    pub async fn task(&self, id: &TaskId) -> Option<AnalysisRun> {
        self.caches.tasks.find_by_task_id(id).await
    }

    /// Ids of every task with at least one saved evaluation.
    pub async fn task_ids_with_evaluations(&self) -> Vec<TaskId> {
        self.caches.evaluations.list_task_ids().await
    }

    /// Saved evaluations of a task, oldest first.
    pub async fn evaluation_history(&self, task_id: &TaskId) -> Vec<Evaluation> {
        self.caches.evaluations.find_by_task_id(task_id).await
    }

    pub async fn latest_evaluation(&self, task_id: &TaskId) -> Option<Evaluation> {
        self.caches.evaluations.find_by_task_id_max_created(task_id).await
    }

    /// Deepest, freshest observation per principal variation.
    pub async fn current_lines(&self, task_id: &TaskId) -> Vec<EngineObservation> {
        self.caches
            .observations
            .find_by_task_id_grouped_by_multi_pv_max_depth_and_occurred_on(task_id)
            .await
    }

    /// True when the engine reported on this task after `since`.
    pub async fn is_alive(&self, task_id: &TaskId, since: DateTime<Utc>) -> bool {
        self.caches
            .observations
            .find_by_task_id_max_occurred_on(task_id)
            .await
            .is_some_and(|latest| latest.occurred_on > since)
    }

    /// Freshest explored line starting with `san_prefix`.
    pub async fn explored_continuation(&self, task_id: &TaskId, san_prefix: &str) -> Option<EngineObservation> {
        self.caches
            .observations
            .find_by_task_id_and_line_san_prefix_max_occurred_on(task_id, san_prefix)
            .await
    }

    pub async fn estimated_completion(&self, id: &TaskId) -> Option<DateTime<Utc>> {
        self.task(id).await?.estimated_completion_time()
    }

    pub fn is_engine_active(&self) -> bool {
        self.lock.is_active()
    }

    /// Wait until no analysis holds the engine.
    pub async fn block_while_active(&self) {
        self.lock.block_while_active().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::engine::scripted_observation;
    use chrono::Duration;

    fn observation(task: &str, pv: u32, depth: u32, line: &str, at: DateTime<Utc>) -> EngineObservation {
        EngineObservation {
            task_id: TaskId::new(task),
            occurred_on: at,
            ..scripted_observation(pv, depth, 10, line)
        }
    }

    #[tokio::test]
    async fn test_misses_are_absent() {
        let queries = AnalysisQueries::new(Caches::default(), EngineLock::new());
        let id = TaskId::new("nothing");
        assert!(queries.latest_task().await.is_none());
        assert!(queries.task(&id).await.is_none());
        assert!(queries.evaluation_history(&id).await.is_empty());
        assert!(queries.current_lines(&id).await.is_empty());
        assert!(!queries.is_alive(&id, Utc::now()).await);
        assert!(queries.estimated_completion(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_liveness_and_continuations() {
        let caches = Caches::default();
        let now = Utc::now();
        caches
            .observations
            .save(observation("t1", 1, 10, "e4 e5 Nf3", now - Duration::seconds(5)))
            .await;
        caches.observations.save(observation("t1", 2, 10, "d4 d5", now)).await;

        let queries = AnalysisQueries::new(caches, EngineLock::new());
        let id = TaskId::new("t1");
        assert!(queries.is_alive(&id, now - Duration::seconds(1)).await);
        assert!(!queries.is_alive(&id, now).await);
        assert_eq!(queries.current_lines(&id).await.len(), 2);

        let continuation = queries.explored_continuation(&id, "e4 e5").await.unwrap();
        assert_eq!(continuation.multi_pv, 1);
        assert!(queries.explored_continuation(&id, "c4").await.is_none());
    }

    #[tokio::test]
    async fn test_block_while_active_returns_when_idle() {
        let queries = AnalysisQueries::new(Caches::default(), EngineLock::new());
        assert!(!queries.is_engine_active());
        queries.block_while_active().await;
    }
}
