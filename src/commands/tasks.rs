//! Task persistence commands.
//!
//! The surface awaits both calls. Loading never fails; saving answers with a
//! success flag and leaves any user-facing warning to the surface.

use tauri::{command, State};

use crate::app::AppTray;
use crate::error::TrayTodoResult;
use crate::tasks::{Task, TaskCount, TaskStore};

/// Load the whole task collection (empty when nothing usable is stored).
#[command]
pub async fn load_tasks(store: State<'_, TaskStore>) -> TrayTodoResult<Vec<Task>> {
    Ok(store.load().await)
}

/// Overwrite the stored collection. Returns whether the write succeeded.
#[command]
pub async fn save_tasks(
    tasks: Vec<Task>,
    store: State<'_, TaskStore>,
    tray: State<'_, AppTray>,
) -> TrayTodoResult<bool> {
    let saved = store.save(&tasks).await;

    if saved {
        if let Err(e) = tray.update_summary(&TaskCount::from_tasks(&tasks)) {
            log::warn!("[TASKS] Failed to refresh tray tooltip: {}", e);
        }
    }

    Ok(saved)
}
