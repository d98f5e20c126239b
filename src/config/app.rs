//! Application-level configuration.
//!
//! Contains the fixed values that shape the popup window and app-wide
//! behavior:
//! - Popup geometry (width, min/max height, distance from the tray icon)
//! - Startup and animation timing
//! - Global hotkey and task file name

use serde::{Deserialize, Serialize};
use tauri::State;
use ts_rs::TS;

/// Popup window geometry, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../ui/types/")]
pub struct WindowConfig {
    /// Fixed popup width.
    pub width: u32,
    /// Initial height, also the smallest height a resize may request.
    pub min_height: u32,
    /// Largest height a resize may request.
    pub max_height: u32,
    /// Gap between the tray icon and the popup edge.
    pub tray_margin: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 350,
            min_height: 250,
            max_height: 600,
            tray_margin: 10,
        }
    }
}

impl WindowConfig {
    /// Clamp a requested height into the allowed range.
    pub fn clamp_height(&self, height: u32) -> u32 {
        height.clamp(self.min_height, self.max_height.max(self.min_height))
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../ui/types/")]
pub struct AppConfig {
    pub window: WindowConfig,
    /// Delay before the window is pre-created, so the tray shows up first.
    pub startup_delay_ms: u32,
    /// Duration of the bottom-anchored resize animation.
    pub resize_animation_ms: u32,
    /// Accelerator that toggles the popup from anywhere.
    pub hotkey: String,
    /// File name of the task collection inside the app data directory.
    pub tasks_file_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            startup_delay_ms: 500,
            resize_animation_ms: 120,
            hotkey: "CommandOrControl+Shift+T".to_string(),
            tasks_file_name: "tasks.json".to_string(),
        }
    }
}

// ============================================================================
// Tauri Commands
// ============================================================================

/// Get the current app configuration.
#[tauri::command]
pub fn get_app_config(config: State<'_, AppConfig>) -> AppConfig {
    config.inner().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.window.width, 350);
        assert_eq!(config.window.min_height, 250);
        assert_eq!(config.window.max_height, 600);
        assert_eq!(config.window.tray_margin, 10);
        assert_eq!(config.hotkey, "CommandOrControl+Shift+T");
        assert_eq!(config.tasks_file_name, "tasks.json");
    }

    #[test]
    fn test_clamp_height() {
        let window = WindowConfig::default();
        assert_eq!(window.clamp_height(100), 250);
        assert_eq!(window.clamp_height(420), 420);
        assert_eq!(window.clamp_height(5000), 600);
    }

    #[test]
    fn test_config_serializes_camel_case() {
        let json = serde_json::to_value(AppConfig::default()).unwrap();
        assert_eq!(json["window"]["minHeight"], 250);
        assert_eq!(json["startupDelayMs"], 500);
        assert_eq!(json["tasksFileName"], "tasks.json");
    }
}
