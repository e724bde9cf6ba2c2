//! Mutual exclusion around the single compute engine.
//!
//! At most one analysis runs at a time. Holding an [`EngineLease`] is holding
//! the engine; the lease releases on drop, so a failing or panicking run can
//! never leave the engine locked.

use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::models::TaskId;

/// The engine lock.
#[derive(Debug, Clone, Default)]
pub struct EngineLock {
    holder: Arc<Mutex<Option<TaskId>>>,
}

/// Proof of exclusive access to the engine.
#[derive(Debug)]
pub struct EngineLease {
    guard: OwnedMutexGuard<Option<TaskId>>,
}

impl EngineLease {
    /// Task currently holding the engine.
    pub fn holder(&self) -> Option<&TaskId> {
        self.guard.as_ref()
    }

    /// Release explicitly. Dropping the lease has the same effect.
    pub fn release(mut self) {
        *self.guard = None;
    }
}

impl Drop for EngineLease {
    fn drop(&mut self) {
        if let Some(task_id) = self.guard.take() {
            tracing::debug!(task_id = %task_id, "engine lock released");
        }
    }
}

impl EngineLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the engine if it is free, without waiting.
    pub fn try_acquire(&self, task_id: &TaskId) -> Option<EngineLease> {
        let mut guard = Arc::clone(&self.holder).try_lock_owned().ok()?;
        *guard = Some(task_id.clone());
        tracing::debug!(task_id = %task_id, "engine lock acquired");
        Some(EngineLease { guard })
    }

    /// Wait until the engine is free, then take it.
    pub async fn acquire(&self, task_id: &TaskId) -> EngineLease {
        let mut guard = Arc::clone(&self.holder).lock_owned().await;
        *guard = Some(task_id.clone());
        tracing::debug!(task_id = %task_id, "engine lock acquired");
        EngineLease { guard }
    }

    /// Wait for the active run to finish without taking the engine.
    pub async fn block_while_active(&self) {
        drop(self.holder.lock().await);
    }

    /// True while some run holds the engine.
    pub fn is_active(&self) -> bool {
        self.holder.try_lock().is_err()
    }
}
