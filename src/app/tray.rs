//! System tray setup and event handling.
//!
//! One tray icon lives for the whole process. Its tooltip mirrors the task
//! counts pushed by the surface; its menu and clicks drive the popup window.

use parking_lot::Mutex;
use tauri::{
    image::Image,
    menu::{Menu, MenuItem, PredefinedMenuItem},
    tray::{MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent},
    App, AppHandle, Manager,
};

use super::lifecycle::Lifecycle;
use super::platform::bounds_from_rect;
use super::window::{PopupHost, WindowController};
use super::{AppTray, AppWindows};
use crate::error::TrayTodoResult;
use crate::tasks::TaskCount;

/// Id of the single tray icon.
pub const TRAY_ID: &str = "main-tray";

/// Tooltip shown until the surface reports its first summary.
pub const DEFAULT_TOOLTIP: &str = "Todo App - Click to open";

/// Tooltip for an empty task list.
pub const NO_TASKS_TOOLTIP: &str = "Todo App - No tasks";

/// Tooltip text for a task-count summary.
pub fn tooltip_for(count: &TaskCount) -> String {
    if count.total == 0 {
        NO_TASKS_TOOLTIP.to_string()
    } else {
        format!(
            "Todo App - {} active, {} completed",
            count.active, count.completed
        )
    }
}

/// Handle to the OS tray icon.
pub trait TrayHandle: Clone + Send + Sync + 'static {
    fn set_tooltip_text(&self, text: &str) -> TrayTodoResult<()>;
}

/// Owns the tray icon and its current tooltip.
pub struct TrayController<T: TrayHandle> {
    tray: Mutex<Option<T>>,
    tooltip: Mutex<String>,
}

impl<T: TrayHandle> Default for TrayController<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TrayHandle> TrayController<T> {
    pub fn new() -> Self {
        Self {
            tray: Mutex::new(None),
            tooltip: Mutex::new(DEFAULT_TOOLTIP.to_string()),
        }
    }

    pub fn attach(&self, tray: T) {
        *self.tray.lock() = Some(tray);
    }

    pub fn tooltip(&self) -> String {
        self.tooltip.lock().clone()
    }

    /// Refresh the tooltip from a summary. Unchanged text is not re-sent.
    pub fn update_summary(&self, count: &TaskCount) -> TrayTodoResult<()> {
        let text = tooltip_for(count);
        let tray = self.tray.lock().clone();

        // Held across the OS call so the cache always matches the last text set.
        let mut current = self.tooltip.lock();
        if *current == text {
            return Ok(());
        }
        if let Some(tray) = tray {
            tray.set_tooltip_text(&text)?;
        }
        *current = text;
        Ok(())
    }
}

/// Entries of the tray context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    ShowTasks,
    QuickAdd,
    ToggleTheme,
    Quit,
}

/// What the caller should do after a tray action ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayOutcome {
    Continue,
    Exit,
}

impl TrayAction {
    pub const ALL: [TrayAction; 4] = [
        TrayAction::ShowTasks,
        TrayAction::QuickAdd,
        TrayAction::ToggleTheme,
        TrayAction::Quit,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            TrayAction::ShowTasks => "show",
            TrayAction::QuickAdd => "quick_add",
            TrayAction::ToggleTheme => "toggle_theme",
            TrayAction::Quit => "quit",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrayAction::ShowTasks => "Show Tasks",
            TrayAction::QuickAdd => "➕ Quick Add Task",
            TrayAction::ToggleTheme => "🌓 Toggle Theme",
            TrayAction::Quit => "❌ Quit",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.id() == id)
    }

    pub fn perform<H: PopupHost>(
        &self,
        windows: &WindowController<H>,
        lifecycle: &Lifecycle,
    ) -> TrayTodoResult<TrayOutcome> {
        match self {
            TrayAction::ShowTasks => windows.show()?,
            TrayAction::QuickAdd => windows.quick_add()?,
            TrayAction::ToggleTheme => windows.toggle_theme()?,
            TrayAction::Quit => {
                lifecycle.begin_quit();
                return Ok(TrayOutcome::Exit);
            }
        }
        Ok(TrayOutcome::Continue)
    }
}

/// Mouse interaction on the tray icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayClick {
    Single,
    Double,
}

impl TrayClick {
    pub fn perform<H: PopupHost>(&self, windows: &WindowController<H>) -> TrayTodoResult<()> {
        match self {
            TrayClick::Single => windows.toggle(),
            TrayClick::Double => windows.show(),
        }
    }
}

// Window creation from a sync tray callback can deadlock on Windows, so the
// work runs on the async runtime.
fn spawn_action(app: &AppHandle, action: TrayAction) {
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        let windows = app.state::<AppWindows>();
        let lifecycle = app.state::<Lifecycle>();
        match action.perform(windows.inner(), lifecycle.inner()) {
            Ok(TrayOutcome::Exit) => {
                log::info!("[TRAY] Quit requested");
                app.exit(0);
            }
            Ok(TrayOutcome::Continue) => {}
            Err(e) => log::error!("[TRAY] '{}' failed: {}", action.id(), e),
        }
    });
}

fn spawn_click(app: &AppHandle, click: TrayClick) {
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        let windows = app.state::<AppWindows>();
        if let Err(e) = click.perform(windows.inner()) {
            log::error!("[TRAY] {:?} click failed: {}", click, e);
        }
    });
}

fn remember_anchor(app: &AppHandle, rect: &tauri::Rect) {
    let scale = app
        .primary_monitor()
        .ok()
        .flatten()
        .map(|m| m.scale_factor())
        .unwrap_or(1.0);
    app.state::<AppWindows>()
        .remember_anchor(bounds_from_rect(rect, scale));
}

/// Set up the system tray with menu and event handlers.
pub fn setup_system_tray(app: &App) -> Result<TrayIcon, Box<dyn std::error::Error>> {
    let item = |action: TrayAction| {
        MenuItem::with_id(app, action.id(), action.label(), true, None::<&str>)
    };
    let show = item(TrayAction::ShowTasks)?;
    let quick_add = item(TrayAction::QuickAdd)?;
    let toggle_theme = item(TrayAction::ToggleTheme)?;
    let quit = item(TrayAction::Quit)?;
    let separator = PredefinedMenuItem::separator(app)?;

    let menu = Menu::with_items(
        app,
        &[
            &show,
            &quick_add,
            &separator,
            &toggle_theme,
            &separator,
            &quit,
        ],
    )?;

    // 32x32 is standard for system tray
    let tray_icon = Image::from_bytes(include_bytes!("../../icons/32x32.png"))?;

    let tray = TrayIconBuilder::with_id(TRAY_ID)
        .icon(tray_icon)
        .tooltip(DEFAULT_TOOLTIP)
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_menu_event(|app, event| match TrayAction::from_id(event.id.as_ref()) {
            Some(action) => spawn_action(app, action),
            None => log::warn!("[TRAY] Unknown menu entry '{}'", event.id.as_ref()),
        })
        .on_tray_icon_event(|tray, event| match event {
            TrayIconEvent::Click {
                rect,
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } => {
                remember_anchor(tray.app_handle(), &rect);
                spawn_click(tray.app_handle(), TrayClick::Single);
            }
            TrayIconEvent::DoubleClick {
                rect,
                button: MouseButton::Left,
                ..
            } => {
                remember_anchor(tray.app_handle(), &rect);
                spawn_click(tray.app_handle(), TrayClick::Double);
            }
            _ => {}
        })
        .build(app)?;

    Ok(tray)
}

/// Create the tray icon and hand it to the managed tray controller.
///
/// This is called from the app setup hook.
pub fn init(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let tray = setup_system_tray(app)?;
    app.state::<AppTray>().attach(tray);
    log::info!("[TRAY] Tray icon ready");
    Ok(())
}
