//! JSON file persistence for the task collection.
//!
//! The whole collection is read and written at once. Load never fails: a
//! missing, unreadable or malformed file yields an empty collection. Save
//! reports success as a flag and leaves retrying to the caller.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tauri::{AppHandle, Manager};

use super::Task;
use crate::error::{ResultExt, TrayTodoResult};

/// Reads and writes `tasks.json`.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store rooted in the per-user app data directory.
    pub fn for_app(app: &AppHandle, file_name: &str) -> TrayTodoResult<Self> {
        let dir = app
            .path()
            .app_data_dir()
            .context("Failed to get app data dir")?;
        Ok(Self::new(dir.join(file_name)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the task collection, substituting an empty one on any failure.
    pub async fn load(&self) -> Vec<Task> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("[TASKS] No task file at {:?}, starting empty", self.path);
                return Vec::new();
            }
            Err(e) => {
                log::warn!("[TASKS] Failed to read {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Task>>(&content) {
            Ok(tasks) => {
                log::debug!("[TASKS] Loaded {} tasks", tasks.len());
                tasks
            }
            Err(e) => {
                log::warn!("[TASKS] Ignoring malformed task file {:?}: {}", self.path, e);
                Vec::new()
            }
        }
    }

    /// Overwrite the file with the full collection. Returns whether it worked.
    pub async fn save(&self, tasks: &[Task]) -> bool {
        match self.write(tasks).await {
            Ok(()) => {
                log::debug!("[TASKS] Saved {} tasks", tasks.len());
                true
            }
            Err(e) => {
                log::error!("[TASKS] Failed to save tasks to {:?}: {}", self.path, e);
                false
            }
        }
    }

    async fn write(&self, tasks: &[Task]) -> TrayTodoResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(tasks)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
