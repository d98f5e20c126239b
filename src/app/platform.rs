//! Tauri-backed implementations of the window and tray seams.
//!
//! Geometry crosses this boundary in logical pixels: the surface measures in
//! CSS pixels and the window builder sizes in logical units, so converting
//! the OS's physical coordinates here keeps the controllers DPI-agnostic.

use tauri::{
    tray::TrayIcon, AppHandle, Emitter, LogicalPosition, LogicalSize, Manager, WebviewUrl,
    WebviewWindow, WebviewWindowBuilder,
};

use super::bridge::FOCUS_INPUT;
use super::geometry::Bounds;
use super::tray::{TrayHandle, TRAY_ID};
use super::window::{PopupHost, PopupWindow, MAIN_WINDOW_LABEL};
use crate::config::WindowConfig;
use crate::error::{TrayTodoError, TrayTodoResult};

/// Script run in the surface by the tray's "Toggle Theme" entry.
const TOGGLE_THEME_SCRIPT: &str = "window.toggleTheme && window.toggleTheme()";

fn window_err(action: &str, e: tauri::Error) -> TrayTodoError {
    TrayTodoError::WindowError(format!("Failed to {}: {}", action, e))
}

fn logical_bounds(x: f64, y: f64, width: f64, height: f64) -> Bounds {
    Bounds::new(
        x.round() as i32,
        y.round() as i32,
        width.round().max(0.0) as u32,
        height.round().max(0.0) as u32,
    )
}

/// Outer position paired with the client size, the pair the window setters take.
fn window_bounds(outer_position: LogicalPosition<f64>, inner_size: LogicalSize<f64>) -> Bounds {
    logical_bounds(
        outer_position.x,
        outer_position.y,
        inner_size.width,
        inner_size.height,
    )
}

/// The popup's webview window.
#[derive(Clone)]
pub struct TauriWindow(WebviewWindow);

impl TauriWindow {
    fn scale(&self) -> f64 {
        self.0.scale_factor().unwrap_or(1.0)
    }
}

impl PopupWindow for TauriWindow {
    fn is_visible(&self) -> bool {
        self.0.is_visible().unwrap_or(false)
    }

    fn show(&self) -> TrayTodoResult<()> {
        self.0.show().map_err(|e| window_err("show window", e))
    }

    fn hide(&self) -> TrayTodoResult<()> {
        self.0.hide().map_err(|e| window_err("hide window", e))
    }

    fn focus(&self) -> TrayTodoResult<()> {
        self.0.set_focus().map_err(|e| window_err("focus window", e))
    }

    fn center(&self) -> TrayTodoResult<()> {
        self.0.center().map_err(|e| window_err("center window", e))
    }

    fn bounds(&self) -> TrayTodoResult<Bounds> {
        let scale = self.scale();
        let position = self
            .0
            .outer_position()
            .map_err(|e| window_err("get position", e))?
            .to_logical::<f64>(scale);
        // Inner size: `set_bounds` writes it back through `set_size`.
        let size = self
            .0
            .inner_size()
            .map_err(|e| window_err("get size", e))?
            .to_logical::<f64>(scale);
        Ok(window_bounds(position, size))
    }

    fn set_position(&self, x: i32, y: i32) -> TrayTodoResult<()> {
        self.0
            .set_position(LogicalPosition::new(x as f64, y as f64))
            .map_err(|e| window_err("set position", e))
    }

    fn set_bounds(&self, bounds: Bounds) -> TrayTodoResult<()> {
        self.set_position(bounds.x, bounds.y)?;
        self.0
            .set_size(LogicalSize::new(bounds.width as f64, bounds.height as f64))
            .map_err(|e| window_err("set size", e))
    }

    fn monitors(&self) -> Vec<Bounds> {
        self.0
            .available_monitors()
            .unwrap_or_default()
            .iter()
            .map(|m| {
                let position = m.position().to_logical::<f64>(m.scale_factor());
                let size = m.size().to_logical::<f64>(m.scale_factor());
                logical_bounds(position.x, position.y, size.width, size.height)
            })
            .collect()
    }

    fn is_devtools_open(&self) -> bool {
        #[cfg(debug_assertions)]
        {
            self.0.is_devtools_open()
        }
        #[cfg(not(debug_assertions))]
        {
            false
        }
    }

    fn send_focus_input(&self) -> TrayTodoResult<()> {
        self.0
            .emit(FOCUS_INPUT, ())
            .map_err(|e| window_err("send focus-input", e))
    }

    fn toggle_theme(&self) -> TrayTodoResult<()> {
        self.0
            .eval(TOGGLE_THEME_SCRIPT)
            .map_err(|e| window_err("run theme toggle", e))
    }
}

/// Builds the popup window and looks up the tray icon.
pub struct TauriHost {
    app: AppHandle,
}

impl TauriHost {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn scale(&self) -> f64 {
        if let Some(window) = self.app.get_webview_window(MAIN_WINDOW_LABEL) {
            if let Ok(scale) = window.scale_factor() {
                return scale;
            }
        }
        self.app
            .primary_monitor()
            .ok()
            .flatten()
            .map(|m| m.scale_factor())
            .unwrap_or(1.0)
    }
}

/// Convert a tray rectangle reported by Tauri into logical bounds.
pub fn bounds_from_rect(rect: &tauri::Rect, scale: f64) -> Bounds {
    let position = rect.position.to_logical::<f64>(scale);
    let size = rect.size.to_logical::<f64>(scale);
    logical_bounds(position.x, position.y, size.width, size.height)
}

impl PopupHost for TauriHost {
    type Window = TauriWindow;

    fn create_window(&self, config: &WindowConfig) -> TrayTodoResult<TauriWindow> {
        if let Some(existing) = self.app.get_webview_window(MAIN_WINDOW_LABEL) {
            return Ok(TauriWindow(existing));
        }

        let width = config.width as f64;

        // Frameless, not user-resizable; height changes only come from the surface.
        let window = WebviewWindowBuilder::new(
            &self.app,
            MAIN_WINDOW_LABEL,
            WebviewUrl::App("index.html".into()),
        )
        .title("Todo App")
        .inner_size(width, config.min_height as f64)
        .min_inner_size(width, config.min_height as f64)
        .max_inner_size(width, config.max_height as f64)
        .resizable(false)
        .decorations(false)
        .always_on_top(true)
        .skip_taskbar(false)
        .visible(false)
        .focused(false)
        .build()
        .map_err(|e| window_err("create popup window", e))?;

        Ok(TauriWindow(window))
    }

    fn tray_anchor(&self) -> Option<Bounds> {
        let tray = self.app.tray_by_id(TRAY_ID)?;
        let rect = tray.rect().ok().flatten()?;
        Some(bounds_from_rect(&rect, self.scale()))
    }
}

impl TrayHandle for TrayIcon {
    fn set_tooltip_text(&self, text: &str) -> TrayTodoResult<()> {
        self.set_tooltip(Some(text))
            .map_err(|e| TrayTodoError::TrayError(format!("Failed to set tooltip: {}", e)))
    }
}
