//! Window event handlers.
//!
//! This is called from the Tauri builder's `on_window_event` hook. Only the
//! popup window is handled; close requests become hides outside the quitting
//! phase, focus loss hides the popup, and destruction clears the controller.

use tauri::{Manager, Window, WindowEvent};

use super::lifecycle::{CloseDecision, Lifecycle};
use super::window::MAIN_WINDOW_LABEL;
use super::AppWindows;

pub fn handle_window_event(window: &Window, event: &WindowEvent) {
    if window.label() != MAIN_WINDOW_LABEL {
        return;
    }
    let app = window.app_handle();
    let Some(windows) = app.try_state::<AppWindows>() else {
        return;
    };

    match event {
        WindowEvent::CloseRequested { api, .. } => {
            let lifecycle = app.state::<Lifecycle>();
            if lifecycle.close_decision() == CloseDecision::HideInstead {
                api.prevent_close();
                if let Err(e) = windows.hide() {
                    log::error!("[WINDOW] Failed to hide on close: {}", e);
                }
            }
        }

        WindowEvent::Focused(false) => {
            if let Err(e) = windows.handle_focus_lost() {
                log::error!("[WINDOW] Failed to hide on blur: {}", e);
            }
        }

        WindowEvent::Destroyed => windows.handle_destroyed(),

        _ => {}
    }
}
