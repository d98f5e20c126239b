//! Task records and their persistence.
//!
//! ## Architecture
//!
//! ```text
//! mod.rs   (task record + count summary)
//!   |
//!   +-- store.rs (JSON file load/save)
//!   +-- tests.rs (unit tests)
//! ```
//!
//! The record schema is owned by the rendering surface. Records are kept as
//! opaque JSON values so a load/save round trip writes back exactly what was
//! read; the core only peeks at `completed` when counting.

pub mod store;

pub use store::TaskStore;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// One to-do entry as stored by the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Task(Value);

impl Task {
    /// Whether the surface marked the entry done. Anything but `true` is active.
    pub fn is_completed(&self) -> bool {
        self.0
            .get("completed")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for Task {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Derived task counts shown in the tray tooltip. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../ui/types/")]
pub struct TaskCount {
    pub total: u32,
    pub active: u32,
    pub completed: u32,
}

impl TaskCount {
    /// Summarize a task collection.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|t| t.is_completed()).count() as u32;
        let total = tasks.len() as u32;
        Self {
            total,
            active: total - completed,
            completed,
        }
    }
}
