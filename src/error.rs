//! Central error types for Tray Todo.
//!
//! All errors implement `Serialize` so they can cross the Tauri IPC boundary
//! as plain message strings.

use serde::Serialize;
use thiserror::Error;

/// Main error type for Tray Todo operations.
#[derive(Error, Debug)]
pub enum TrayTodoError {
    /// Task file could not be read or written
    #[error("Storage error: {0}")]
    StorageError(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Window creation or manipulation failed
    #[error("Window error: {0}")]
    WindowError(String),

    /// Tray icon or tray menu operation failed
    #[error("Tray error: {0}")]
    TrayError(String),

    /// Global shortcut could not be parsed or registered
    #[error("Shortcut error: {0}")]
    ShortcutError(String),

    /// Payload of a surface notification did not match its channel
    #[error("Invalid payload for '{channel}': {reason}")]
    InvalidPayload { channel: String, reason: String },

    /// Error bubbled up from the Tauri runtime
    #[error("Tauri error: {0}")]
    TauriError(#[from] tauri::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Tauri requires command errors to be serializable; send the message only.
impl Serialize for TrayTodoError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<String> for TrayTodoError {
    fn from(msg: String) -> Self {
        TrayTodoError::Other(msg)
    }
}

impl From<&str> for TrayTodoError {
    fn from(msg: &str) -> Self {
        TrayTodoError::Other(msg.to_string())
    }
}

/// Extension trait for adding context to Results.
///
/// # Example
/// ```ignore
/// use crate::error::{ResultExt, TrayTodoResult};
///
/// fn log_dir(app: &tauri::AppHandle) -> TrayTodoResult<PathBuf> {
///     app.path().app_log_dir().context("failed to resolve log directory")
/// }
/// ```
pub trait ResultExt<T> {
    /// Add context to an error, converting it to TrayTodoError::Other.
    fn context(self, msg: &str) -> TrayTodoResult<T>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F: FnOnce() -> String>(self, f: F) -> TrayTodoResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context(self, msg: &str) -> TrayTodoResult<T> {
        self.map_err(|e| TrayTodoError::Other(format!("{}: {}", msg, e)))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> TrayTodoResult<T> {
        self.map_err(|e| TrayTodoError::Other(format!("{}: {}", f(), e)))
    }
}

/// Extension trait for turning a missing value into an error.
pub trait OptionExt<T> {
    /// Convert None to TrayTodoError::Other with the given message.
    fn context(self, msg: &str) -> TrayTodoResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn context(self, msg: &str) -> TrayTodoResult<T> {
        self.ok_or_else(|| TrayTodoError::Other(msg.to_string()))
    }
}

/// Type alias for Results using TrayTodoError.
pub type TrayTodoResult<T> = Result<T, TrayTodoError>;
