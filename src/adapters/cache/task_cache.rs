//! Bounded cache of requested analysis runs, keyed by task id.

use crate::domain::models::{AnalysisRun, TaskId};

use super::bounded::BoundedCache;

/// Default number of runs kept.
pub const TASK_CACHE_CAPACITY: usize = 100;

/// Cache of the analysis runs this node accepted.
pub struct TaskCache {
    runs: BoundedCache<TaskId, AnalysisRun>,
}

impl TaskCache {
    pub fn new() -> Self {
        Self::with_capacity(TASK_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            runs: BoundedCache::new(capacity),
        }
    }

    /// Upsert a run under its task id.
    pub async fn save(&self, run: AnalysisRun) {
        self.runs.insert(run.task_id.clone(), run).await;
    }

    /// Save `run` unless an equivalent run is cached, atomically.
    ///
    /// Returns the id of the cached equivalent when one exists.
    pub async fn save_if_unique(&self, run: AnalysisRun) -> Result<(), TaskId> {
        self.runs
            .write(|slots| {
                if let Some((existing, _)) = slots.iter().find(|(_, cached)| run.is_same_as(cached)) {
                    return Err(existing.clone());
                }
                slots.insert(run.task_id.clone(), run);
                Ok(())
            })
            .await
    }

    /// The most recently created run still cached.
    pub async fn find_latest(&self) -> Option<AnalysisRun> {
        self.runs
            .read(|slots| slots.iter().map(|(_, run)| run).max_by_key(|run| run.created).cloned())
            .await
    }

    /// Look up a run by id or id prefix.
    ///
    /// An exact id wins over prefix matches; among several prefix matches the
    /// most recently created run is returned. The hit is refreshed.
    pub async fn find_by_task_id(&self, id: &TaskId) -> Option<AnalysisRun> {
        self.runs
            .write(|slots| {
                let found = slots
                    .iter()
                    .filter(|(key, _)| key.matches(id))
                    .max_by_key(|(key, run)| (*key == id, run.created))
                    .map(|(key, run)| (key.clone(), run.clone()));
                let (key, run) = found?;
                slots.touch(&key);
                Some(run)
            })
            .await
    }

    /// True iff an equivalent run (see [`AnalysisRun::is_same_as`]) is cached.
    pub async fn has_duplicate(&self, run: &AnalysisRun) -> bool {
        self.runs
            .read(|slots| slots.iter().any(|(_, cached)| run.is_same_as(cached)))
            .await
    }

    pub async fn len(&self) -> usize {
        self.runs.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.runs.is_empty().await
    }
}

impl Default for TaskCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AnalysisLimit, Position};
    use chrono::{Duration, Utc};

    fn run(id: &str, minutes_ago: i64) -> AnalysisRun {
        AnalysisRun {
            task_id: TaskId::new(id),
            name: None,
            reference: None,
            engine_program_name: "stockfish".to_string(),
            uci_engine_name: None,
            hostname: None,
            starting_position: Position::new("", "fen", 0, true),
            initial_pv: 3,
            limit: AnalysisLimit::Depth(20),
            engine_options: vec![],
            use_syzygy_path: false,
            dynamic_pv: None,
            created: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_find_latest() {
        let cache = TaskCache::new();
        assert!(cache.find_latest().await.is_none());

        cache.save(run("older", 10)).await;
        cache.save(AnalysisRun { initial_pv: 1, ..run("newest", 1) }).await;
        cache.save(AnalysisRun { initial_pv: 2, ..run("middle", 5) }).await;

        assert_eq!(cache.find_latest().await.unwrap().task_id, TaskId::new("newest"));
    }

    #[tokio::test]
    async fn test_find_by_prefix() {
        let cache = TaskCache::new();
        cache.save(run("abcdef", 1)).await;

        assert!(cache.find_by_task_id(&TaskId::new("abc")).await.is_some());
        assert!(cache.find_by_task_id(&TaskId::new("abcdef")).await.is_some());
        assert!(cache.find_by_task_id(&TaskId::new("")).await.is_none());
        assert!(cache.find_by_task_id(&TaskId::new("xyz")).await.is_none());
    }

    #[tokio::test]
    async fn test_exact_id_beats_prefix() {
        let cache = TaskCache::new();
        cache.save(run("abc", 10)).await;
        cache.save(AnalysisRun { initial_pv: 7, ..run("abcdef", 1) }).await;

        let found = cache.find_by_task_id(&TaskId::new("abc")).await.unwrap();
        assert_eq!(found.task_id, TaskId::new("abc"));
    }

    #[tokio::test]
    async fn test_has_duplicate() {
        let cache = TaskCache::new();
        let original = run("first", 1);
        cache.save(original.clone()).await;

        let resubmitted = AnalysisRun {
            task_id: TaskId::new("second"),
            created: Utc::now(),
            ..original.clone()
        };
        assert!(cache.has_duplicate(&resubmitted).await);

        let other_engine = AnalysisRun {
            engine_program_name: "lc0".to_string(),
            ..resubmitted
        };
        assert!(!cache.has_duplicate(&other_engine).await);
    }

    #[tokio::test]
    async fn test_save_if_unique() {
        let cache = TaskCache::new();
        assert!(cache.save_if_unique(run("first", 1)).await.is_ok());
        assert_eq!(
            cache.save_if_unique(run("second", 0)).await,
            Err(TaskId::new("first"))
        );
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_capacity_bound() {
        let cache = TaskCache::with_capacity(5);
        for i in 0..20 {
            cache.save(AnalysisRun { initial_pv: i, ..run(&format!("task-{i}"), 0) }).await;
        }
        assert_eq!(cache.len().await, 5);
    }
}
