//! Usage: Durable single-key holder for the bearer token (the sole source of "logged in").
//!
//! The token is persisted as `{"token": "..."}` and mirrored in memory so reads stay
//! synchronous. Writes go through a temp file + rename so a crash never leaves a
//! half-written session behind.

use crate::shared::error::AppResult;
use crate::shared::mutex_ext::MutexExt;
use crate::shared::security::mask_token;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    token: String,
}

#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    token: Mutex<Option<String>>,
}

impl SessionStore {
    /// Open the store at `path`, loading any token persisted by a previous run.
    ///
    /// An unreadable or corrupt file counts as "no session".
    pub fn init(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                format!(
                    "STORAGE_ERROR: failed to create session dir {}: {e}",
                    parent.display()
                )
            })?;
        }

        let token = read_persisted_token(&path);
        tracing::debug!(
            path = %path.display(),
            has_session = token.is_some(),
            "session store initialized"
        );

        Ok(Self {
            path,
            token: Mutex::new(token),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self) -> Option<String> {
        self.token.lock_or_recover().clone()
    }

    pub fn has_session(&self) -> bool {
        self.token.lock_or_recover().is_some()
    }

    /// Persist `token` and make it the current session (last write wins).
    pub fn set(&self, token: &str) -> AppResult<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err("SEC_INVALID_INPUT: session token must not be empty".into());
        }

        let mut guard = self.token.lock_or_recover();
        write_session_file(&self.path, token)?;
        *guard = Some(token.to_string());
        tracing::info!(token = %mask_token(token), "session established");
        Ok(())
    }

    /// Drop the session. Returns whether one existed.
    pub fn clear(&self) -> bool {
        let mut guard = self.token.lock_or_recover();
        let existed = guard.take().is_some();

        if let Err(e) = remove_persisted_token(&self.path) {
            tracing::error!(
                path = %self.path.display(),
                "persisted session could not be invalidated: {e}"
            );
        }

        if existed {
            tracing::info!("session cleared");
        }
        existed
    }
}

fn read_persisted_token(path: &Path) -> Option<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), "failed to read persisted session: {e}");
            return None;
        }
    };

    match serde_json::from_str::<PersistedSession>(&content) {
        Ok(session) => {
            let token = session.token.trim();
            (!token.is_empty()).then(|| token.to_string())
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "ignoring corrupt persisted session: {e}");
            None
        }
    }
}

/// Delete the session file. When it cannot be deleted, overwrite it with a blank token so
/// a reload still finds no session.
fn remove_persisted_token(path: &Path) -> AppResult<()> {
    let remove_err = match std::fs::remove_file(path) {
        Ok(()) => return Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => e,
    };
    tracing::warn!(
        path = %path.display(),
        "failed to remove persisted session, writing blank token: {remove_err}"
    );
    write_session_file(path, "").map_err(|e| {
        format!("STORAGE_ERROR: remove failed ({remove_err}) and blank overwrite failed ({e})")
            .into()
    })
}

fn write_session_file(path: &Path, token: &str) -> AppResult<()> {
    let tmp_path = path.with_extension("json.tmp");
    let content = serde_json::to_vec(&PersistedSession {
        token: token.to_string(),
    })
    .map_err(|e| format!("STORAGE_ERROR: failed to serialize session: {e}"))?;

    std::fs::write(&tmp_path, content)
        .map_err(|e| format!("STORAGE_ERROR: failed to write temp session file: {e}"))?;

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(format!("STORAGE_ERROR: failed to finalize session file: {e}").into());
    }
    Ok(())
}
