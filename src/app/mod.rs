//! Application lifecycle and platform integration.
//!
//! - `window`: popup window controller and its OS seam
//! - `geometry`: tray-anchored placement and bottom-anchored resize math
//! - `tray`: system tray setup, menu and tooltip
//! - `bridge`: one-way notifications to and from the rendering surface
//! - `events`: window event handlers
//! - `lifecycle`: quitting phase, single instance, global hotkey
//! - `platform`: Tauri implementations of the window and tray seams

pub mod bridge;
pub mod events;
pub mod geometry;
pub mod lifecycle;
pub mod platform;
pub mod tray;
pub mod window;

/// Window controller as managed in Tauri state.
pub type AppWindows = window::WindowController<platform::TauriHost>;

/// Tray controller as managed in Tauri state.
pub type AppTray = tray::TrayController<tauri::tray::TrayIcon>;
