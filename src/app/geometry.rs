//! Popup placement math.
//!
//! # Placement Rules
//!
//! 1. **Primary Position**: centered horizontally on the tray icon, above it,
//!    separated by the tray margin
//! 2. **Vertical Fallback**: if the monitor holding the tray icon is known and
//!    the popup would leave it through the top (taskbar at the top of the
//!    screen), place it below the tray icon instead
//! 3. **Horizontal Clamp**: keep the popup inside that monitor
//!
//! Resizes keep the bottom edge where it is; growth and shrinkage happen at
//! the top edge. All values are logical pixels.

use serde::{Deserialize, Serialize};

/// Screen rectangle in logical pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center_x(&self) -> i32 {
        self.x + (self.width as i32) / 2
    }

    pub fn center_y(&self) -> i32 {
        self.y + (self.height as i32) / 2
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Top-left position for a popup of `size` anchored to the tray icon.
pub fn popup_position(
    tray: Bounds,
    size: (u32, u32),
    margin: u32,
    monitors: &[Bounds],
) -> (i32, i32) {
    let (width, height) = (size.0 as i32, size.1 as i32);
    let margin = margin as i32;

    let x = tray.center_x() - width / 2;
    let above_y = tray.y - height - margin;

    let Some(monitor) = monitors
        .iter()
        .find(|m| m.contains_point(tray.center_x(), tray.center_y()))
    else {
        return (x, above_y);
    };

    let y = if above_y >= monitor.y {
        above_y
    } else {
        tray.bottom() + margin
    };

    // Narrow monitors: prefer the left edge over the right one.
    let x = x.min(monitor.right() - width).max(monitor.x);

    (x, y)
}

/// Bounds after resizing to `height` with the bottom edge held in place.
pub fn bottom_anchored(current: Bounds, height: u32) -> Bounds {
    Bounds {
        y: current.bottom() - height as i32,
        height,
        ..current
    }
}

/// Height frame `t` (0.0..=1.0, already eased) of a resize from `from` to
/// `to`, with the bottom edge of `from` held in place.
pub fn resize_frame(from: Bounds, to_height: u32, t: f32) -> Bounds {
    let t = t.clamp(0.0, 1.0);
    let start = from.height as f32;
    let end = to_height as f32;
    let height = (start + (end - start) * t).round() as u32;
    bottom_anchored(from, height)
}
