// Access-code persistence.
//
// The service accepts an optional access code with each submission. The
// last code that authenticated successfully is kept in a single file under
// the user's data directory so it survives restarts; a 403 from the server
// deletes it again.

use std::path::PathBuf;

use tracing::warn;

/// File-backed store holding at most one access-code string.
#[derive(Debug, Clone)]
pub struct AccessCodeStore {
    path: PathBuf,
}

impl AccessCodeStore {
    pub fn new(path: PathBuf) -> Self {
        AccessCodeStore { path }
    }

    /// Store under the user's data directory (the default location).
    pub fn open_default() -> anyhow::Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "mechtag")
            .ok_or_else(|| anyhow::anyhow!("could not determine a data directory"))?;
        Ok(AccessCodeStore::new(dirs.data_dir().join("access_code")))
    }

    /// The persisted code, if any. Read failures are treated as absent.
    pub fn load(&self) -> Option<String> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        let code = text.trim();
        if code.is_empty() {
            None
        } else {
            Some(code.to_string())
        }
    }

    /// Persist a code, replacing any previous one. Failures are logged and
    /// swallowed: losing the convenience of a saved code must never break a
    /// successful submission.
    pub fn save(&self, code: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("failed to create access-code directory: {e}");
                return;
            }
        }
        if let Err(e) = std::fs::write(&self.path, code) {
            warn!("failed to persist access code: {e}");
        }
    }

    /// Remove the persisted code, if present.
    pub fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("failed to clear access code: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
