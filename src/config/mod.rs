//! Application configuration.
//!
//! - `AppConfig`: window geometry limits, animation timing, hotkey and the
//!   task file name. Built once at startup and managed as Tauri state.
//!
//! Nothing here is persisted; geometry resets to these defaults each launch.

pub mod app;

pub use app::{AppConfig, WindowConfig};
