//! Per-user activity log.
//!
//! One append-only text file per username, one line per event:
//! `[YYYY-MM-DD HH:MM:SS] <message>` in local time.

use chrono::Local;
use log::warn;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Appender for one user's activity file.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: Option<PathBuf>,
}

impl ActivityLog {
    /// Log at `<dir>/<username>_activity.log`.
    ///
    /// Separators and control characters in `username` become `_`, so the
    /// file always lands directly inside `dir`.
    pub fn for_user(dir: &Path, username: &str) -> Self {
        Self {
            path: Some(dir.join(format!("{}_activity.log", file_stem(username)))),
        }
    }

    /// Log that discards every entry.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Appends one timestamped line.
    ///
    /// Failures are reported to diagnostics only; activity logging never
    /// interrupts the session.
    pub fn record(&self, message: &str) {
        let Some(path) = &self.path else {
            return;
        };
        let line = format_entry(&Local::now().format(TIMESTAMP_FORMAT).to_string(), message);
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(line.as_bytes()));
        if let Err(err) = written {
            warn!(
                "event=activity_append module=activity status=error path={} error={}",
                path.display(),
                err
            );
        }
    }
}

fn file_stem(username: &str) -> String {
    username
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

fn format_entry(timestamp: &str, message: &str) -> String {
    let message = message.replace(['\n', '\r'], " ");
    format!("[{timestamp}] {message}\n")
}
