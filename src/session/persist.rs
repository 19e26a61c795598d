//! Saved login persistence — the localStorage analog.
//!
//! A tiny TOML file under the work dir holds the username and token of the
//! last login so the client resumes logged in. The file holds nothing else;
//! stories and profile data are re-fetched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;

const SESSION_FILE: &str = "session.toml";

/// The persisted credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSession {
    pub username: String,
    pub token: String,
}

/// Reads and writes the session file under a fixed work dir.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(work_dir: &Path) -> Self {
        Self { path: work_dir.join(SESSION_FILE) }
    }

    /// Load the saved session. A missing file is simply `None`; a file that
    /// does not parse is an error so the caller can decide to clear it.
    pub fn load(&self) -> Result<Option<SavedSession>, AppError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::SessionFile(format!(
                    "cannot read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let saved = toml::from_str(&raw).map_err(|e| {
            AppError::SessionFile(format!("parse error in {}: {e}", self.path.display()))
        })?;
        debug!(path = %self.path.display(), "loaded saved session");
        Ok(Some(saved))
    }

    /// Persist `saved`, creating the work dir on first use.
    pub fn save(&self, saved: &SavedSession) -> Result<(), AppError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let raw = toml::to_string(saved)
            .map_err(|e| AppError::SessionFile(format!("serialize error: {e}")))?;
        fs::write(&self.path, raw)?;
        debug!(path = %self.path.display(), "saved session");
        Ok(())
    }

    /// Remove the saved session. Removing an absent file is not an error.
    pub fn clear(&self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "cleared saved session");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
