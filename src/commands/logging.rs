//! Unified logging system for Tray Todo.
//!
//! Every `log` record, from Rust or forwarded by the surface through
//! `write_log`, goes to the console (env_logger, `RUST_LOG` filter) and to a
//! daily log file with size-based rotation and cleanup.

use chrono::Local;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tauri::{command, AppHandle, Manager};

use crate::error::{ResultExt, TrayTodoError, TrayTodoResult};

/// Maximum log file size before rotation (5MB)
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum number of log files to keep
const MAX_LOG_FILES: usize = 5;

/// Prefix of every log file name
const LOG_FILE_PREFIX: &str = "tray-todo";

lazy_static::lazy_static! {
    /// Global log file handle
    static ref LOG_FILE: Mutex<Option<File>> = Mutex::new(None);
    /// Log directory path
    static ref LOG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

/// Console logger plus the rotating log file.
struct AppLogger {
    console: env_logger::Logger,
}

impl log::Log for AppLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.console.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.console.log(record);
        write_line(&format_line(
            record.level(),
            record.target(),
            &record.args().to_string(),
        ));
    }

    fn flush(&self) {
        self.console.flush();
        if let Some(file) = LOG_FILE.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

/// Initialize the logging system
pub fn init_logging(app: &AppHandle) -> TrayTodoResult<()> {
    let log_dir = app
        .path()
        .app_log_dir()
        .context("Failed to get log directory")?;

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;
    *LOG_DIR.lock() = Some(log_dir.clone());

    let file = open_log_file(&get_current_log_path(&log_dir))?;
    *LOG_FILE.lock() = Some(file);

    let console = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .build();
    let max_level = console.filter();
    log::set_boxed_logger(Box::new(AppLogger { console }))
        .map_err(|e| TrayTodoError::Other(format!("Logger already installed: {}", e)))?;
    log::set_max_level(max_level);

    log::info!("Logging system initialized");
    log::info!("Log directory: {:?}", log_dir);

    cleanup_old_logs(&log_dir);

    Ok(())
}

fn open_log_file(path: &Path) -> TrayTodoResult<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("Failed to open log file")
}

/// Get the path for the current log file (one per day)
fn get_current_log_path(log_dir: &Path) -> PathBuf {
    let date = Local::now().format("%Y-%m-%d");
    log_dir.join(format!("{}_{}.log", LOG_FILE_PREFIX, date))
}

/// Single log line as written to the file
fn format_line(level: log::Level, source: &str, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    format!("[{}] [{}] [{}] {}\n", timestamp, level, source, message)
}

/// Clean up old log files, keeping only the most recent MAX_LOG_FILES
fn cleanup_old_logs(log_dir: &Path) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "log")
                    .unwrap_or(false)
            })
            .collect();

        // Newest first
        log_files.sort_by(|a, b| {
            let a_time = a.metadata().and_then(|m| m.modified()).ok();
            let b_time = b.metadata().and_then(|m| m.modified()).ok();
            b_time.cmp(&a_time)
        });

        for file in log_files.into_iter().skip(MAX_LOG_FILES) {
            let _ = fs::remove_file(file.path());
        }
    }
}

fn write_line(line: &str) {
    if let Some(file) = LOG_FILE.lock().as_mut() {
        let _ = file.write_all(line.as_bytes());
    }
    check_rotation();
}

/// Check if log rotation is needed and rotate if necessary
fn check_rotation() {
    let Some(log_dir) = LOG_DIR.lock().clone() else {
        return;
    };

    let current_path = get_current_log_path(&log_dir);
    let Ok(metadata) = fs::metadata(&current_path) else {
        return;
    };
    if metadata.len() <= MAX_LOG_SIZE {
        return;
    }

    let timestamp = Local::now().format("%Y-%m-%d_%H%M%S");
    let rotated_path = log_dir.join(format!("{}_{}.log", LOG_FILE_PREFIX, timestamp));
    let _ = fs::rename(&current_path, &rotated_path);

    if let Ok(file) = open_log_file(&current_path) {
        *LOG_FILE.lock() = Some(file);
    }

    cleanup_old_logs(&log_dir);
}

/// Map a surface log level name onto `log::Level`
fn parse_level(level: &str) -> log::Level {
    match level.to_lowercase().as_str() {
        "trace" => log::Level::Trace,
        "debug" => log::Level::Debug,
        "warn" | "warning" => log::Level::Warn,
        "error" => log::Level::Error,
        _ => log::Level::Info,
    }
}

// ============================================================================
// Tauri Commands
// ============================================================================

/// Write a log message from the frontend
#[command]
pub fn write_log(level: String, source: String, message: String) {
    log::log!(target: source.as_str(), parse_level(&level), "{}", message);
}

/// Write multiple log messages from the frontend (batch)
#[command]
pub fn write_logs(logs: Vec<(String, String, String)>) {
    for (level, source, message) in logs {
        write_log(level, source, message);
    }
}

/// Get the log directory path
#[command]
pub fn get_log_dir(app: AppHandle) -> TrayTodoResult<String> {
    let log_dir = app
        .path()
        .app_log_dir()
        .context("Failed to get log directory")?;

    Ok(log_dir.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), log::Level::Debug);
        assert_eq!(parse_level("warning"), log::Level::Warn);
        assert_eq!(parse_level("error"), log::Level::Error);
        assert_eq!(parse_level("verbose"), log::Level::Info);
    }

    #[test]
    fn test_format_line() {
        let line = format_line(log::Level::Warn, "surface", "save failed");
        assert!(line.ends_with("[WARN] [surface] save failed\n"));
        assert!(line.starts_with('['));
    }

    #[test]
    fn test_current_log_path_is_daily() {
        let dir = Path::new("/tmp/logs");
        let path = get_current_log_path(dir);
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("tray-todo_"));
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "tray-todo_2024-01-01.log".len());
    }

    #[test]
    fn test_cleanup_keeps_newest_logs() {
        let dir = TempDir::new().unwrap();
        let now = SystemTime::now();

        for i in 0..(MAX_LOG_FILES + 3) {
            let path = dir.path().join(format!("tray-todo_{}.log", i));
            let file = File::create(&path).unwrap();
            // file i is i minutes old
            file.set_modified(now - Duration::from_secs(60 * i as u64))
                .unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();

        cleanup_old_logs(dir.path());

        let mut remaining: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        remaining.sort();

        assert!(remaining.contains(&"notes.txt".to_string()));
        let logs: Vec<_> = remaining.iter().filter(|n| n.ends_with(".log")).collect();
        assert_eq!(logs.len(), MAX_LOG_FILES);
        for i in 0..MAX_LOG_FILES {
            assert!(remaining.contains(&format!("tray-todo_{}.log", i)));
        }
    }
}
