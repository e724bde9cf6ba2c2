//! Bounded set of raw engine observations.
//!
//! Observations are their own key, so a repeated update collapses into the
//! existing entry and only refreshes it.

use std::collections::BTreeMap;

use crate::domain::models::{EngineObservation, TaskId};

use super::bounded::BoundedCache;

/// Default number of observations kept across all tasks.
pub const OBSERVATION_CACHE_CAPACITY: usize = 10_000;

/// Cache of engine observations.
pub struct ObservationCache {
    observations: BoundedCache<EngineObservation, ()>,
}

impl ObservationCache {
    pub fn new() -> Self {
        Self::with_capacity(OBSERVATION_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            observations: BoundedCache::new(capacity),
        }
    }

    /// Insert or refresh an observation.
    pub async fn save(&self, observation: EngineObservation) {
        self.observations.insert(observation, ()).await;
    }

    /// Current state of every principal variation of a task.
    ///
    /// Among complete observations, keeps the deepest one per PV id (later
    /// `occurred_on` wins at equal depth), refreshes the kept entries and
    /// returns them ordered by PV id.
    pub async fn find_by_task_id_grouped_by_multi_pv_max_depth_and_occurred_on(
        &self,
        task_id: &TaskId,
    ) -> Vec<EngineObservation> {
        self.observations
            .write(|slots| {
                let mut deepest: BTreeMap<u32, &EngineObservation> = BTreeMap::new();
                for (observation, ()) in slots.iter() {
                    if &observation.task_id != task_id || !observation.has_game() {
                        continue;
                    }
                    deepest
                        .entry(observation.multi_pv)
                        .and_modify(|kept| {
                            if (observation.depth, observation.occurred_on) > (kept.depth, kept.occurred_on) {
                                *kept = observation;
                            }
                        })
                        .or_insert(observation);
                }
                let kept: Vec<EngineObservation> = deepest.into_values().cloned().collect();
                for observation in &kept {
                    slots.touch(observation);
                }
                kept
            })
            .await
    }

    /// The most recent observation of a task, complete or not.
    ///
    /// Used as a heartbeat: the engine is alive while this keeps advancing.
    pub async fn find_by_task_id_max_occurred_on(&self, task_id: &TaskId) -> Option<EngineObservation> {
        self.observations
            .read(|slots| {
                slots
                    .iter()
                    .map(|(observation, ())| observation)
                    .filter(|observation| &observation.task_id == task_id)
                    .max_by_key(|observation| observation.occurred_on)
                    .cloned()
            })
            .await
    }

    /// The most recent complete observation whose line starts with `san_prefix`.
    pub async fn find_by_task_id_and_line_san_prefix_max_occurred_on(
        &self,
        task_id: &TaskId,
        san_prefix: &str,
    ) -> Option<EngineObservation> {
        self.observations
            .read(|slots| {
                slots
                    .iter()
                    .map(|(observation, ())| observation)
                    .filter(|observation| &observation.task_id == task_id && observation.has_game())
                    .filter(|observation| {
                        observation
                            .line_san
                            .as_deref()
                            .is_some_and(|line| line.starts_with(san_prefix))
                    })
                    .max_by_key(|observation| observation.occurred_on)
                    .cloned()
            })
            .await
    }

    pub async fn len(&self) -> usize {
        self.observations.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.observations.is_empty().await
    }
}

impl Default for ObservationCache {
    fn default() -> Self {
        Self::new()
    }
}
