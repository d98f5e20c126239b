//! Tauri command handlers: the request/reply half of the surface bridge.

pub mod logging;
pub mod tasks;
