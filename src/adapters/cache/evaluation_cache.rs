//! Bounded cache of evaluation snapshots.
//!
//! Snapshots are keyed by `(task id, max depth)`: a new snapshot at an
//! already-seen depth replaces the old one, deeper snapshots accumulate into
//! a per-task history.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::models::{Evaluation, TaskId};

use super::bounded::BoundedCache;

/// Default number of snapshots kept across all tasks.
pub const EVALUATION_CACHE_CAPACITY: usize = 2000;

type EvaluationKey = (TaskId, u32);

/// Cache of evaluation snapshots.
pub struct EvaluationCache {
    snapshots: BoundedCache<EvaluationKey, Evaluation>,
}

impl EvaluationCache {
    pub fn new() -> Self {
        Self::with_capacity(EVALUATION_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshots: BoundedCache::new(capacity),
        }
    }

    /// Upsert a snapshot at `(task id, max depth)`.
    pub async fn save(&self, evaluation: Evaluation) {
        let key = (evaluation.task_id.clone(), evaluation.max_depth());
        self.snapshots.insert(key, evaluation).await;
    }

    /// Distinct task ids, ordered by the creation time of their earliest snapshot.
    pub async fn list_task_ids(&self) -> Vec<TaskId> {
        let mut first_seen: Vec<(TaskId, DateTime<Utc>)> = self
            .snapshots
            .read(|slots| {
                let mut earliest: HashMap<&TaskId, DateTime<Utc>> = HashMap::new();
                for ((task_id, _), evaluation) in slots.iter() {
                    earliest
                        .entry(task_id)
                        .and_modify(|created| *created = (*created).min(evaluation.created))
                        .or_insert(evaluation.created);
                }
                earliest
                    .into_iter()
                    .map(|(task_id, created)| (task_id.clone(), created))
                    .collect()
            })
            .await;
        first_seen.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        first_seen.into_iter().map(|(task_id, _)| task_id).collect()
    }

    /// The most recently created snapshot of a task.
    pub async fn find_by_task_id_max_created(&self, task_id: &TaskId) -> Option<Evaluation> {
        self.snapshots
            .write(|slots| {
                let (key, evaluation) = slots
                    .iter()
                    .filter(|((id, _), _)| id == task_id)
                    .max_by_key(|(_, evaluation)| evaluation.created)
                    .map(|(key, evaluation)| (key.clone(), evaluation.clone()))?;
                slots.touch(&key);
                Some(evaluation)
            })
            .await
    }

    /// All snapshots of a task, oldest first.
    pub async fn find_by_task_id(&self, task_id: &TaskId) -> Vec<Evaluation> {
        let mut history: Vec<Evaluation> = self
            .snapshots
            .read(|slots| {
                slots
                    .iter()
                    .filter(|((id, _), _)| id == task_id)
                    .map(|(_, evaluation)| evaluation.clone())
                    .collect()
            })
            .await;
        history.sort_by_key(|evaluation| evaluation.created);
        history
    }

    pub async fn len(&self) -> usize {
        self.snapshots.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshots.is_empty().await
    }
}

impl Default for EvaluationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Position, Score, UciState, Variation};
    use chrono::Duration;

    fn snapshot(task: &str, depth: u32, seconds: i64) -> Evaluation {
        let base = DateTime::parse_from_rfc3339("2026-01-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Evaluation {
            task_id: TaskId::new(task),
            created: base + Duration::seconds(seconds),
            variations: vec![Variation {
                pv_id: 1,
                moves: "e4".to_string(),
                score: Score::Centipawns(i32::try_from(depth).unwrap()),
                depth,
                time: std::time::Duration::from_secs(1),
                position: Position::new("", "fen", 0, true),
            }],
            uci_state: UciState::default(),
        }
    }

    #[tokio::test]
    async fn test_same_depth_overwrites() {
        let cache = EvaluationCache::new();
        cache.save(snapshot("t1", 20, 0)).await;
        cache.save(snapshot("t1", 20, 5)).await;

        assert_eq!(cache.len().await, 1);
        let latest = cache.find_by_task_id_max_created(&TaskId::new("t1")).await.unwrap();
        assert_eq!(latest.created, snapshot("t1", 20, 5).created);
    }

    #[tokio::test]
    async fn test_different_depths_form_history() {
        let cache = EvaluationCache::new();
        cache.save(snapshot("t1", 22, 10)).await;
        cache.save(snapshot("t1", 21, 5)).await;
        cache.save(snapshot("t2", 21, 7)).await;

        let history = cache.find_by_task_id(&TaskId::new("t1")).await;
        let depths: Vec<u32> = history.iter().map(Evaluation::max_depth).collect();
        assert_eq!(depths, vec![21, 22]);
        assert!(history[0].created < history[1].created);
    }

    #[tokio::test]
    async fn test_list_task_ids_by_first_snapshot() {
        let cache = EvaluationCache::new();
        cache.save(snapshot("late", 10, 30)).await;
        cache.save(snapshot("early", 12, 20)).await;
        cache.save(snapshot("early", 10, 1)).await;
        cache.save(snapshot("late", 11, 2)).await;

        assert_eq!(
            cache.list_task_ids().await,
            vec![TaskId::new("early"), TaskId::new("late")]
        );
    }

    #[tokio::test]
    async fn test_miss_is_empty() {
        let cache = EvaluationCache::new();
        assert!(cache.find_by_task_id_max_created(&TaskId::new("none")).await.is_none());
        assert!(cache.find_by_task_id(&TaskId::new("none")).await.is_empty());
        assert!(cache.list_task_ids().await.is_empty());
    }
}
