//! Popup window controller.
//!
//! Owns at most one task window. The window is created lazily (first show,
//! or the deferred startup pre-creation) and afterwards only hidden and shown,
//! so its web state survives between appearances.
//!
//! ```text
//! Unborn -> Hidden -> Visible -> Hidden -> ... -> Destroyed (-> Unborn)
//! ```
//!
//! OS access goes through [`PopupHost`] and [`PopupWindow`] so the controller
//! can be driven by fakes in tests. No lock is held while calling into a
//! window: window calls can raise window events synchronously, and those
//! events come back into this controller.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::geometry::{self, Bounds};
use crate::config::WindowConfig;
use crate::error::{OptionExt, TrayTodoResult};

/// Label of the single popup window.
pub const MAIN_WINDOW_LABEL: &str = "main";

/// Time between animation frames (~60 fps).
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Handle to a live popup window.
pub trait PopupWindow: Clone + Send + Sync + 'static {
    fn is_visible(&self) -> bool;
    fn show(&self) -> TrayTodoResult<()>;
    fn hide(&self) -> TrayTodoResult<()>;
    fn focus(&self) -> TrayTodoResult<()>;
    fn center(&self) -> TrayTodoResult<()>;
    fn bounds(&self) -> TrayTodoResult<Bounds>;
    fn set_position(&self, x: i32, y: i32) -> TrayTodoResult<()>;
    fn set_bounds(&self, bounds: Bounds) -> TrayTodoResult<()>;
    /// Monitors the window can be placed on.
    fn monitors(&self) -> Vec<Bounds>;
    /// Whether a developer tools panel is attached and open.
    fn is_devtools_open(&self) -> bool;
    /// Tell the surface to focus its task input (`focus-input`).
    fn send_focus_input(&self) -> TrayTodoResult<()>;
    /// Run the surface's theme toggle routine.
    fn toggle_theme(&self) -> TrayTodoResult<()>;
}

/// Creates popup windows and knows where the tray icon is.
pub trait PopupHost: Send + Sync + 'static {
    type Window: PopupWindow;

    fn create_window(&self, config: &WindowConfig) -> TrayTodoResult<Self::Window>;

    /// Current tray icon bounds, if the platform reports them.
    fn tray_anchor(&self) -> Option<Bounds>;
}

/// Pending bottom-anchored resize animation.
///
/// Created by [`WindowController::resize_anchored`]; run it on the async
/// runtime. A newer resize request makes an older job stop at its next frame.
pub struct ResizeJob<W> {
    window: W,
    from: Bounds,
    to_height: u32,
    duration: Duration,
    generation: Arc<AtomicU64>,
    ticket: u64,
}

impl<W: PopupWindow> ResizeJob<W> {
    pub fn target(&self) -> Bounds {
        geometry::bottom_anchored(self.from, self.to_height)
    }

    /// Play the animation. The last applied frame is exactly [`Self::target`].
    pub async fn run(self) -> TrayTodoResult<()> {
        let frames = (self.duration.as_millis() / FRAME_INTERVAL.as_millis()).max(1) as u32;
        let ease = easing_curve();

        for frame in 1..=frames {
            if self.generation.load(Ordering::SeqCst) != self.ticket {
                log::debug!("[WINDOW] Resize superseded at frame {}/{}", frame, frames);
                return Ok(());
            }

            let bounds = if frame == frames {
                self.target()
            } else {
                geometry::resize_frame(self.from, self.to_height, ease(frame as f32 / frames as f32))
            };
            self.window.set_bounds(bounds)?;

            if frame < frames {
                tokio::time::sleep(FRAME_INTERVAL).await;
            }
        }
        Ok(())
    }
}

/// CSS "ease" curve, linear if the curve cannot be built.
fn easing_curve() -> Box<dyn Fn(f32) -> f32 + Send> {
    match bezier_easing::bezier_easing(0.25, 0.1, 0.25, 1.0) {
        Ok(curve) => Box::new(curve),
        Err(_) => Box::new(|t| t),
    }
}

/// Owns the single popup window.
pub struct WindowController<H: PopupHost> {
    host: H,
    config: WindowConfig,
    animation: Duration,
    window: Mutex<Option<H::Window>>,
    /// Serializes creation so concurrent first shows build one window.
    creating: Mutex<()>,
    /// Last tray rectangle seen in a tray event; used when the host has none.
    last_anchor: Mutex<Option<Bounds>>,
    resize_generation: Arc<AtomicU64>,
}

impl<H: PopupHost> WindowController<H> {
    pub fn new(host: H, config: WindowConfig, animation: Duration) -> Self {
        Self {
            host,
            config,
            animation,
            window: Mutex::new(None),
            creating: Mutex::new(()),
            last_anchor: Mutex::new(None),
            resize_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current window handle, if one exists.
    pub fn window(&self) -> Option<H::Window> {
        self.window.lock().clone()
    }

    pub fn exists(&self) -> bool {
        self.window.lock().is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.window().map(|w| w.is_visible()).unwrap_or(false)
    }

    /// Create the window unless it already exists. Returns the live handle.
    pub fn ensure_created(&self) -> TrayTodoResult<H::Window> {
        if let Some(window) = self.window() {
            return Ok(window);
        }

        // Window events raised during creation only touch `window`, never
        // `creating`, so holding the guard across the build cannot re-enter.
        let _creating = self.creating.lock();
        if let Some(window) = self.window() {
            return Ok(window);
        }

        let created = self.host.create_window(&self.config)?;
        log::info!("[WINDOW] Popup window created");
        *self.window.lock() = Some(created.clone());
        Ok(created)
    }

    /// Remember where the tray icon was last seen.
    pub fn remember_anchor(&self, anchor: Bounds) {
        *self.last_anchor.lock() = Some(anchor);
    }

    fn anchor(&self) -> Option<Bounds> {
        self.host.tray_anchor().or(*self.last_anchor.lock())
    }

    /// Position the popup at the tray icon, show it and give it focus.
    pub fn show(&self) -> TrayTodoResult<()> {
        let window = self.ensure_created()?;

        match self.anchor() {
            Some(tray) => {
                let current = window.bounds()?;
                let (x, y) = geometry::popup_position(
                    tray,
                    (current.width, current.height),
                    self.config.tray_margin,
                    &window.monitors(),
                );
                window.set_position(x, y)?;
            }
            None => window.center()?,
        }

        window.show()?;
        window.focus()
    }

    /// Hide without destroying. No-op when there is no window.
    pub fn hide(&self) -> TrayTodoResult<()> {
        match self.window() {
            Some(window) => window.hide(),
            None => Ok(()),
        }
    }

    pub fn toggle(&self) -> TrayTodoResult<()> {
        if self.is_visible() {
            self.hide()
        } else {
            self.show()
        }
    }

    /// Show the popup, then ask the surface to focus its input.
    pub fn quick_add(&self) -> TrayTodoResult<()> {
        self.show()?;
        self.window()
            .context("Popup window closed before focus-input")?
            .send_focus_input()
    }

    /// Show the popup, then run the surface's theme toggle.
    pub fn toggle_theme(&self) -> TrayTodoResult<()> {
        self.show()?;
        self.window()
            .context("Popup window closed before theme toggle")?
            .toggle_theme()
    }

    /// Focus left the popup: hide it unless developer tools are open.
    pub fn handle_focus_lost(&self) -> TrayTodoResult<()> {
        match self.window() {
            Some(window) if !window.is_devtools_open() => window.hide(),
            _ => Ok(()),
        }
    }

    /// The OS destroyed the window; a later show creates a fresh one.
    pub fn handle_destroyed(&self) {
        if self.window.lock().take().is_some() {
            log::info!("[WINDOW] Popup window destroyed");
        }
    }

    /// Plan a resize to `height` (clamped to the configured range) that keeps
    /// the bottom edge in place. Supersedes any running resize animation.
    ///
    /// Returns `None` when there is no window.
    pub fn resize_anchored(&self, height: u32) -> TrayTodoResult<Option<ResizeJob<H::Window>>> {
        let Some(window) = self.window() else {
            return Ok(None);
        };

        let to_height = self.config.clamp_height(height);
        let from = window.bounds()?;
        let ticket = self.resize_generation.fetch_add(1, Ordering::SeqCst) + 1;

        Ok(Some(ResizeJob {
            window,
            from,
            to_height,
            duration: self.animation,
            generation: Arc::clone(&self.resize_generation),
            ticket,
        }))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory window and host used by the controller tests.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::{PopupHost, PopupWindow};
    use crate::app::geometry::Bounds;
    use crate::config::WindowConfig;
    use crate::error::TrayTodoResult;

    #[derive(Debug, Default)]
    pub struct FakeWindowState {
        pub visible: bool,
        pub focused: bool,
        pub devtools_open: bool,
        pub bounds: Bounds,
        pub history: Vec<Bounds>,
        pub focus_input_sent: usize,
        pub theme_toggles: usize,
        pub centered: usize,
    }

    #[derive(Debug, Clone, Default)]
    pub struct FakeWindow {
        pub state: Arc<Mutex<FakeWindowState>>,
    }

    impl PopupWindow for FakeWindow {
        fn is_visible(&self) -> bool {
            self.state.lock().visible
        }

        fn show(&self) -> TrayTodoResult<()> {
            self.state.lock().visible = true;
            Ok(())
        }

        fn hide(&self) -> TrayTodoResult<()> {
            let mut state = self.state.lock();
            state.visible = false;
            state.focused = false;
            Ok(())
        }

        fn focus(&self) -> TrayTodoResult<()> {
            self.state.lock().focused = true;
            Ok(())
        }

        fn center(&self) -> TrayTodoResult<()> {
            self.state.lock().centered += 1;
            Ok(())
        }

        fn bounds(&self) -> TrayTodoResult<Bounds> {
            Ok(self.state.lock().bounds)
        }

        fn set_position(&self, x: i32, y: i32) -> TrayTodoResult<()> {
            let mut state = self.state.lock();
            state.bounds.x = x;
            state.bounds.y = y;
            Ok(())
        }

        fn set_bounds(&self, bounds: Bounds) -> TrayTodoResult<()> {
            let mut state = self.state.lock();
            state.bounds = bounds;
            state.history.push(bounds);
            Ok(())
        }

        fn monitors(&self) -> Vec<Bounds> {
            vec![Bounds::new(0, 0, 1920, 1080)]
        }

        fn is_devtools_open(&self) -> bool {
            self.state.lock().devtools_open
        }

        fn send_focus_input(&self) -> TrayTodoResult<()> {
            self.state.lock().focus_input_sent += 1;
            Ok(())
        }

        fn toggle_theme(&self) -> TrayTodoResult<()> {
            self.state.lock().theme_toggles += 1;
            Ok(())
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct FakeHost {
        pub created: Arc<AtomicUsize>,
        pub last_window: Arc<Mutex<Option<FakeWindow>>>,
        pub anchor: Option<Bounds>,
        /// Time `create_window` takes, to widen creation races.
        pub create_delay: Duration,
    }

    impl FakeHost {
        pub fn with_tray_at(anchor: Bounds) -> Self {
            Self {
                anchor: Some(anchor),
                ..Self::default()
            }
        }

        pub fn created_count(&self) -> usize {
            self.created.load(Ordering::SeqCst)
        }
    }

    impl PopupHost for FakeHost {
        type Window = FakeWindow;

        fn create_window(&self, config: &WindowConfig) -> TrayTodoResult<FakeWindow> {
            std::thread::sleep(self.create_delay);
            self.created.fetch_add(1, Ordering::SeqCst);
            let window = FakeWindow::default();
            window.state.lock().bounds = Bounds::new(0, 0, config.width, config.min_height);
            *self.last_window.lock() = Some(window.clone());
            Ok(window)
        }

        fn tray_anchor(&self) -> Option<Bounds> {
            self.anchor
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::testing::{FakeHost, FakeWindow};
    use super::*;

    const TRAY: Bounds = Bounds {
        x: 1500,
        y: 1050,
        width: 24,
        height: 24,
    };

    fn controller(host: FakeHost) -> WindowController<FakeHost> {
        WindowController::new(host, WindowConfig::default(), Duration::from_millis(48))
    }

    fn live_window(controller: &WindowController<FakeHost>) -> FakeWindow {
        controller.window().expect("window should exist")
    }

    #[test]
    fn test_unborn_until_first_show() {
        let host = FakeHost::with_tray_at(TRAY);
        let windows = controller(host.clone());

        assert!(!windows.exists());
        assert!(!windows.is_visible());
        windows.hide().unwrap();
        assert_eq!(host.created_count(), 0);

        windows.show().unwrap();
        assert!(windows.is_visible());
        assert_eq!(host.created_count(), 1);
    }

    #[test]
    fn test_concurrent_first_shows_create_one_window() {
        let host = FakeHost {
            create_delay: Duration::from_millis(50),
            ..FakeHost::with_tray_at(TRAY)
        };
        let windows = Arc::new(controller(host.clone()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let windows = Arc::clone(&windows);
                std::thread::spawn(move || windows.show())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(host.created_count(), 1);
        assert!(windows.is_visible());
    }

    #[test]
    fn test_show_is_idempotent_and_creates_once() {
        let host = FakeHost::with_tray_at(TRAY);
        let windows = controller(host.clone());

        windows.show().unwrap();
        windows.show().unwrap();

        assert!(windows.is_visible());
        assert_eq!(host.created_count(), 1);
    }

    #[test]
    fn test_toggle_alternates_visibility() {
        let host = FakeHost::with_tray_at(TRAY);
        let windows = controller(host.clone());
        windows.ensure_created().unwrap();
        assert!(!windows.is_visible());

        windows.toggle().unwrap();
        assert!(windows.is_visible());
        windows.toggle().unwrap();
        assert!(!windows.is_visible());
        assert_eq!(host.created_count(), 1);
    }

    #[test]
    fn test_show_positions_above_tray_and_focuses() {
        let windows = controller(FakeHost::with_tray_at(TRAY));
        windows.show().unwrap();

        let state = live_window(&windows).state;
        let state = state.lock();
        assert!(state.focused);
        assert_eq!(state.bounds.x, TRAY.center_x() - 175);
        assert_eq!(state.bounds.y, TRAY.y - 250 - 10);
    }

    #[test]
    fn test_show_without_anchor_centers() {
        let windows = controller(FakeHost::default());
        windows.show().unwrap();
        assert_eq!(live_window(&windows).state.lock().centered, 1);
    }

    #[test]
    fn test_remembered_anchor_used_when_host_has_none() {
        let windows = controller(FakeHost::default());
        windows.remember_anchor(TRAY);
        windows.show().unwrap();

        let window = live_window(&windows);
        assert_eq!(window.state.lock().centered, 0);
        assert_eq!(window.state.lock().bounds.y, 790);
    }

    #[test]
    fn test_hide_keeps_instance() {
        let host = FakeHost::with_tray_at(TRAY);
        let windows = controller(host.clone());
        windows.show().unwrap();
        windows.hide().unwrap();

        assert!(windows.exists());
        assert!(!windows.is_visible());
        windows.show().unwrap();
        assert_eq!(host.created_count(), 1);
    }

    #[test]
    fn test_focus_lost_hides_unless_devtools_open() {
        let windows = controller(FakeHost::with_tray_at(TRAY));
        windows.show().unwrap();

        live_window(&windows).state.lock().devtools_open = true;
        windows.handle_focus_lost().unwrap();
        assert!(windows.is_visible());

        live_window(&windows).state.lock().devtools_open = false;
        windows.handle_focus_lost().unwrap();
        assert!(!windows.is_visible());
    }

    #[test]
    fn test_destroyed_window_is_recreated_on_show() {
        let host = FakeHost::with_tray_at(TRAY);
        let windows = controller(host.clone());
        windows.show().unwrap();

        windows.handle_destroyed();
        assert!(!windows.exists());

        windows.show().unwrap();
        assert_eq!(host.created_count(), 2);
    }

    #[test]
    fn test_quick_add_and_theme_reach_surface() {
        let windows = controller(FakeHost::with_tray_at(TRAY));
        windows.quick_add().unwrap();
        windows.toggle_theme().unwrap();

        let window = live_window(&windows);
        let state = window.state.lock();
        assert!(state.visible);
        assert_eq!(state.focus_input_sent, 1);
        assert_eq!(state.theme_toggles, 1);
    }

    #[test]
    fn test_resize_without_window_is_noop() {
        let windows = controller(FakeHost::default());
        assert!(windows.resize_anchored(400).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resize_keeps_bottom_edge() {
        let windows = controller(FakeHost::with_tray_at(TRAY));
        windows.show().unwrap();
        let window = live_window(&windows);
        let old = window.bounds().unwrap();

        let job = windows.resize_anchored(420).unwrap().unwrap();
        job.run().await.unwrap();

        let new = window.bounds().unwrap();
        assert_eq!(new.height, 420);
        assert_eq!(new.y + 420, old.y + old.height as i32);

        let state = window.state.lock();
        assert!(state.history.len() > 1, "resize should be animated");
        for frame in &state.history {
            assert_eq!(frame.bottom(), old.bottom());
            assert_eq!(frame.x, old.x);
        }
    }

    #[tokio::test]
    async fn test_resize_height_is_clamped() {
        let windows = controller(FakeHost::with_tray_at(TRAY));
        windows.show().unwrap();
        let window = live_window(&windows);
        let old = window.bounds().unwrap();

        windows.resize_anchored(2000).unwrap().unwrap().run().await.unwrap();
        assert_eq!(window.bounds().unwrap().height, 600);

        windows.resize_anchored(10).unwrap().unwrap().run().await.unwrap();
        let new = window.bounds().unwrap();
        assert_eq!(new.height, 250);
        assert_eq!(new.bottom(), old.bottom());
    }

    #[tokio::test]
    async fn test_newer_resize_supersedes_older() {
        let windows = controller(FakeHost::with_tray_at(TRAY));
        windows.show().unwrap();
        let window = live_window(&windows);

        let stale = windows.resize_anchored(600).unwrap().unwrap();
        let fresh = windows.resize_anchored(300).unwrap().unwrap();
        fresh.run().await.unwrap();
        stale.run().await.unwrap();

        assert_eq!(window.bounds().unwrap().height, 300);
    }
}
