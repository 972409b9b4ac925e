//! File-based debug logger for store backends
//!
//! Backends such as the keychain store run below the injected [`Logger`]
//! and have no handle to it, so they trace into a process-wide append-only
//! file instead. Nothing is written unless `PROPGUARD_DEBUG` is `1`/`true`.
//! `PROPGUARD_LOG_LEVEL` sets the minimum level (default `debug`) and
//! `PROPGUARD_LOG_FILE` overrides the path.
//!
//! [`Logger`]: super::Logger

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::SystemTime;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use super::traits::LogLevel;

struct FileLoggerState {
    path: PathBuf,
    file: Option<File>,
    min_level: LogLevel,
    enabled: bool,
}

impl FileLoggerState {
    fn from_env() -> Self {
        let enabled = std::env::var("PROPGUARD_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let min_level = std::env::var("PROPGUARD_LOG_LEVEL")
            .ok()
            .and_then(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Debug);
        let path = std::env::var_os("PROPGUARD_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(default_log_path);

        // The file is opened lazily so a disabled logger never touches disk
        Self {
            path,
            file: None,
            min_level,
            enabled,
        }
    }

    fn write(&mut self, level: LogLevel, module: &str, message: &str) {
        if !self.enabled || level < self.min_level {
            return;
        }

        if self.file.is_none() {
            self.file = open_append(&self.path);
        }

        if let Some(file) = self.file.as_mut() {
            let _ = writeln!(file, "[{}] [{}] [{}] {}", timestamp(), level, module, message);
            let _ = file.flush();
        }
    }
}

fn default_log_path() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push("propguard-debug.log");
    path
}

fn open_append(path: &PathBuf) -> Option<File> {
    OpenOptions::new().create(true).append(true).open(path).ok()
}

fn timestamp() -> String {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs();
            let millis = d.subsec_millis();
            let hours = (secs % 86400) / 3600;
            let mins = (secs % 3600) / 60;
            let secs = secs % 60;
            format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
        })
        .unwrap_or_else(|_| "??:??:??.???".to_string())
}

static LOGGER: Lazy<Mutex<FileLoggerState>> = Lazy::new(|| Mutex::new(FileLoggerState::from_env()));

/// Log a message at the specified level
pub fn log(level: LogLevel, module: &str, message: &str) {
    LOGGER.lock().write(level, module, message);
}

pub fn trace(module: &str, message: &str) {
    log(LogLevel::Trace, module, message);
}

pub fn debug(module: &str, message: &str) {
    log(LogLevel::Debug, module, message);
}

pub fn info(module: &str, message: &str) {
    log(LogLevel::Info, module, message);
}

pub fn warn(module: &str, message: &str) {
    log(LogLevel::Warn, module, message);
}

pub fn error(module: &str, message: &str) {
    log(LogLevel::Error, module, message);
}

/// Whether the debug file logger is switched on
pub fn is_enabled() -> bool {
    LOGGER.lock().enabled
}

/// Get the path of the log file
pub fn log_file_path() -> PathBuf {
    LOGGER.lock().path.clone()
}

/// Truncate the log file and reopen it
pub fn clear_log() {
    let mut logger = LOGGER.lock();
    if let Ok(file) = File::create(&logger.path) {
        drop(file);
    }
    logger.file = None;
}
