//! Task identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of one requested analysis.
///
/// Ids are compared by prefix when looked up, so operators can refer to a
/// task by the first few characters of its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True iff `other` is non-empty and this id starts with it.
    ///
    /// Matching is not symmetric: a long id matches its short prefix but
    /// not the other way around.
    pub fn matches(&self, other: &TaskId) -> bool {
        !other.0.is_empty() && self.0.starts_with(&other.0)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
