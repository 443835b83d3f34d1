use crate::shared::fs_atomic::atomic_write_private_file;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to read session {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write session {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to remove session {path}: {source}")]
    Remove {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid session file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode session: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub username: String,
    pub token: String,
    pub created_at: String,
}

impl AdminSession {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

pub fn load_session(path: &Path) -> Result<Option<AdminSession>, SessionError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| SessionError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| SessionError::Parse {
            path: path.display().to_string(),
            source,
        })
}

/// Stores the session readable only by the owner.
pub fn save_session(path: &Path, session: &AdminSession) -> Result<(), SessionError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SessionError::Write {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let body = serde_json::to_string_pretty(session).map_err(SessionError::Encode)?;
    atomic_write_private_file(path, body.as_bytes()).map_err(|source| SessionError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Returns whether a session existed.
pub fn clear_session(path: &Path) -> Result<bool, SessionError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(SessionError::Remove {
            path: path.display().to_string(),
            source,
        }),
    }
}
