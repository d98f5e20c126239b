//! One-way notifications between the rendering surface and the core.
//!
//! Request/reply traffic (`load_tasks`, `save_tasks`) goes through Tauri
//! commands in `commands::tasks`. Everything here is fire-and-forget and
//! travels as Tauri events:
//!
//! | Channel                | Direction       | Payload                        |
//! |------------------------|-----------------|--------------------------------|
//! | `update-window-height` | surface → core  | height in CSS pixels           |
//! | `hide-window`          | surface → core  | none                           |
//! | `update-tray-tooltip`  | surface → core  | `{total, active, completed}`   |
//! | `focus-input`          | core → surface  | none                           |
//!
//! Incoming notifications funnel through a single queue so they are applied
//! in the order they arrived.

use serde_json::Value;
use tauri::{AppHandle, Listener, Manager};
use tokio::sync::mpsc;

use super::tray::{TrayController, TrayHandle};
use super::window::{PopupHost, ResizeJob, WindowController};
use super::{AppTray, AppWindows};
use crate::error::{TrayTodoError, TrayTodoResult};
use crate::tasks::TaskCount;

pub const UPDATE_WINDOW_HEIGHT: &str = "update-window-height";
pub const HIDE_WINDOW: &str = "hide-window";
pub const UPDATE_TRAY_TOOLTIP: &str = "update-tray-tooltip";
pub const FOCUS_INPUT: &str = "focus-input";

/// A notification sent by the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceNotification {
    UpdateWindowHeight(u32),
    HideWindow,
    UpdateTrayTooltip(TaskCount),
}

impl SurfaceNotification {
    /// Channels the core listens on.
    pub const CHANNELS: [&'static str; 3] = [UPDATE_WINDOW_HEIGHT, HIDE_WINDOW, UPDATE_TRAY_TOOLTIP];

    /// Decode the JSON payload received on `channel`.
    pub fn parse(channel: &str, payload: &str) -> TrayTodoResult<Self> {
        let invalid = |reason: String| TrayTodoError::InvalidPayload {
            channel: channel.to_string(),
            reason,
        };

        match channel {
            UPDATE_WINDOW_HEIGHT => {
                let value: Value = serde_json::from_str(payload).map_err(|e| invalid(e.to_string()))?;
                let height = value
                    .as_f64()
                    .filter(|h| h.is_finite() && *h >= 0.0)
                    .ok_or_else(|| invalid(format!("expected a height, got {}", value)))?;
                Ok(Self::UpdateWindowHeight(height.round().min(u32::MAX as f64) as u32))
            }
            HIDE_WINDOW => Ok(Self::HideWindow),
            UPDATE_TRAY_TOOLTIP => serde_json::from_str::<TaskCount>(payload)
                .map(Self::UpdateTrayTooltip)
                .map_err(|e| invalid(e.to_string())),
            other => Err(invalid(format!("unknown channel '{}'", other))),
        }
    }

    /// Apply the notification. A height change yields an animation to run.
    pub fn apply<H: PopupHost, T: TrayHandle>(
        self,
        windows: &WindowController<H>,
        tray: &TrayController<T>,
    ) -> TrayTodoResult<Option<ResizeJob<H::Window>>> {
        match self {
            Self::UpdateWindowHeight(height) => windows.resize_anchored(height),
            Self::HideWindow => windows.hide().map(|_| None),
            Self::UpdateTrayTooltip(count) => tray.update_summary(&count).map(|_| None),
        }
    }
}

/// Subscribe to the surface channels. Must run after the controllers are managed.
pub fn listen(app: &AppHandle) {
    let (tx, mut rx) = mpsc::unbounded_channel::<SurfaceNotification>();

    for channel in SurfaceNotification::CHANNELS {
        let tx = tx.clone();
        app.listen(channel, move |event| {
            match SurfaceNotification::parse(channel, event.payload()) {
                Ok(notification) => {
                    let _ = tx.send(notification);
                }
                Err(e) => log::warn!("[BRIDGE] Dropping notification: {}", e),
            }
        });
    }

    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        while let Some(notification) = rx.recv().await {
            log::trace!("[BRIDGE] {:?}", notification);
            let windows = app.state::<AppWindows>();
            let tray = app.state::<AppTray>();
            match notification.apply(windows.inner(), tray.inner()) {
                Ok(Some(job)) => {
                    tauri::async_runtime::spawn(async move {
                        if let Err(e) = job.run().await {
                            log::error!("[BRIDGE] Resize failed: {}", e);
                        }
                    });
                }
                Ok(None) => {}
                Err(e) => log::error!("[BRIDGE] Notification failed: {}", e),
            }
        }
    });
}
