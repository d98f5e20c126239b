//! Process lifecycle: quitting phase, single instance and the global hotkey.
//!
//! Closing the popup never ends the process. Only the tray's Quit entry or an
//! exit request that carries an exit code moves the app into the quitting
//! phase; from then on close requests are honored and the process exits.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use tauri::{AppHandle, Manager, RunEvent, Runtime};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutState};

use super::window::{PopupHost, WindowController};
use super::AppWindows;
use crate::error::{TrayTodoError, TrayTodoResult};

/// Decision for a user-initiated window close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Keep the window alive and hide it.
    HideInstead,
    /// Let the close go through.
    Proceed,
}

/// Decision for a request to end the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    /// Keep running in the tray.
    Prevent,
    Proceed,
}

/// One-way "running in tray" → "shutting down" flag.
#[derive(Debug, Default)]
pub struct Lifecycle {
    quitting: AtomicBool,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting.load(Ordering::SeqCst)
    }

    pub fn begin_quit(&self) {
        if !self.quitting.swap(true, Ordering::SeqCst) {
            log::info!("[LIFECYCLE] Entering quitting phase");
        }
    }

    pub fn close_decision(&self) -> CloseDecision {
        if self.is_quitting() {
            CloseDecision::Proceed
        } else {
            CloseDecision::HideInstead
        }
    }

    /// `code` is `None` when the last window went away on its own; that alone
    /// never ends the app. An explicit exit code is the before-quit signal.
    pub fn exit_decision(&self, code: Option<i32>) -> ExitDecision {
        match code {
            None if !self.is_quitting() => ExitDecision::Prevent,
            _ => {
                self.begin_quit();
                ExitDecision::Proceed
            }
        }
    }
}

/// A second launch was blocked: bring the existing popup forward.
pub fn restore_existing<H: PopupHost>(windows: &WindowController<H>) -> TrayTodoResult<()> {
    log::info!("[LIFECYCLE] Second instance launched, restoring window");
    windows.show()
}

/// Single-instance plugin callback.
pub fn on_second_instance(app: &AppHandle) {
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        let Some(windows) = app.try_state::<AppWindows>() else {
            return;
        };
        if let Err(e) = restore_existing(windows.inner()) {
            log::error!("[LIFECYCLE] Failed to restore window: {}", e);
        }
    });
}

/// Global shortcut plugin; every registered shortcut toggles the popup.
pub fn hotkey_plugin<R: Runtime>() -> tauri::plugin::TauriPlugin<R> {
    tauri_plugin_global_shortcut::Builder::new()
        .with_handler(|app, shortcut, event| {
            // The hotkey library fires on press and release.
            if event.state != ShortcutState::Pressed {
                return;
            }
            log::debug!("[LIFECYCLE] Hotkey {:?} pressed", shortcut);
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                if let Some(windows) = app.try_state::<AppWindows>() {
                    if let Err(e) = windows.toggle() {
                        log::error!("[LIFECYCLE] Hotkey toggle failed: {}", e);
                    }
                }
            });
        })
        .build()
}

pub fn parse_hotkey(hotkey: &str) -> TrayTodoResult<Shortcut> {
    Shortcut::from_str(hotkey)
        .map_err(|e| TrayTodoError::ShortcutError(format!("Invalid hotkey '{}': {}", hotkey, e)))
}

pub fn register_hotkey<R: Runtime>(app: &AppHandle<R>, hotkey: &str) -> TrayTodoResult<()> {
    let shortcut = parse_hotkey(hotkey)?;
    app.global_shortcut().register(shortcut).map_err(|e| {
        TrayTodoError::ShortcutError(format!("Failed to register '{}': {}", hotkey, e))
    })?;
    log::info!("[LIFECYCLE] Registered hotkey {}", hotkey);
    Ok(())
}

pub fn unregister_hotkeys<R: Runtime>(app: &AppHandle<R>) {
    match app.global_shortcut().unregister_all() {
        Ok(()) => log::debug!("[LIFECYCLE] Hotkeys unregistered"),
        Err(e) => log::warn!("[LIFECYCLE] Failed to unregister hotkeys: {}", e),
    }
}

/// Event loop hook passed to `App::run`.
pub fn handle_run_event(app: &AppHandle, event: RunEvent) {
    match event {
        RunEvent::ExitRequested { code, api, .. } => {
            let lifecycle = app.state::<Lifecycle>();
            if lifecycle.exit_decision(code) == ExitDecision::Prevent {
                api.prevent_exit();
            }
        }
        RunEvent::Exit => {
            unregister_hotkeys(app);
            log::info!("[LIFECYCLE] Exiting");
        }
        #[cfg(target_os = "macos")]
        RunEvent::Reopen { .. } => {
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                if let Err(e) = app.state::<AppWindows>().show() {
                    log::error!("[LIFECYCLE] Failed to show window on reopen: {}", e);
                }
            });
        }
        _ => {}
    }
}
