use crate::config::default_log_path;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn log_line(level: &str, event: &str, message: &str) -> Option<String> {
    let payload = serde_json::json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "level": level,
        "event": event,
        "message": message,
    });
    serde_json::to_string(&payload).ok()
}

/// Appends one JSON line; failures are swallowed so logging never fails a command.
pub fn append_log_to(path: &Path, level: &str, event: &str, message: &str) {
    let Some(line) = log_line(level, event, message) else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}

/// Destination for command events. Disabled when no home directory resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn default_location() -> Self {
        Self {
            path: default_log_path().ok(),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn record(&self, level: &str, event: &str, message: &str) {
        if let Some(path) = &self.path {
            append_log_to(path, level, event, message);
        }
    }
}

/// Short sha256 prefix used in place of a token in log lines.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest
        .iter()
        .take(6)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
