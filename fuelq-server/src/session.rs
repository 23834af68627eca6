//! Persisted login flag.
//!
//! A single JSON file remembers whether the user is logged in, so the
//! server can send them straight to the station list on the next launch.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Default session file, relative to the working directory.
const DEFAULT_PATH: &str = "fuelq_session.json";

/// Errors writing the session file.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session file error: {message}")]
    Io { message: String },
}

/// What is remembered between launches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub is_logged_in: bool,
    pub email: Option<String>,
}

impl Session {
    /// Page to open at launch.
    pub fn landing_path(&self) -> &'static str {
        if self.is_logged_in { "/stations" } else { "/login" }
    }

    /// Email of the logged-in user.
    pub fn user(&self) -> Option<&str> {
        if self.is_logged_in {
            self.email.as_deref()
        } else {
            None
        }
    }
}

/// On-disk session storage.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    /// Serialises read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Load the session. A missing or unreadable file means logged out.
    pub fn load(&self) -> Session {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    /// Record a successful login.
    pub async fn log_in(&self, email: &str) -> Result<(), SessionError> {
        let _guard = self.write_lock.lock().await;
        self.save(&Session {
            is_logged_in: true,
            email: Some(email.to_string()),
        })
    }

    /// Forget the logged-in user.
    pub async fn log_out(&self) -> Result<(), SessionError> {
        let _guard = self.write_lock.lock().await;
        self.save(&Session::default())
    }

    /// Write the session file, creating parent directories if needed.
    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| SessionError::Io {
                    message: format!("failed to create session directory: {e}"),
                })?;
            }
        }

        let json = serde_json::to_string_pretty(session).map_err(|e| SessionError::Io {
            message: format!("failed to serialize session: {e}"),
        })?;

        std::fs::write(&self.path, json).map_err(|e| SessionError::Io {
            message: format!("failed to write session file: {e}"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_PATH)
    }
}
