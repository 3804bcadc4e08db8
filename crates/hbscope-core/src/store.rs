// ── Session persistence capability ──
//
// The session manager only ever sees raw strings under one fixed key; it
// owns parsing, so a corrupt entry is its call to discard. Backends here:
// in-memory (tests, embedding) and a JSON file. The config crate adds a
// system-keyring backend.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;

/// Key the persisted session lives under.
pub const SESSION_KEY: &str = "hb-auth-session";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("session backend error: {0}")]
    Backend(String),
}

/// Where the persisted session lives.
///
/// `load` returns `Ok(None)` when nothing is stored. `clear` on an empty
/// store is not an error.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn save(&self, raw: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

// ── Memory ───────────────────────────────────────────────────────────

/// Process-local store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    value: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the store, e.g. with a corrupt entry in tests.
    pub fn with_value(raw: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(raw.into())),
        }
    }

    /// Current raw contents.
    pub fn peek(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.value
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.lock().clone())
    }

    fn save(&self, raw: &str) -> Result<(), StoreError> {
        *self.lock() = Some(raw.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.lock() = None;
        Ok(())
    }
}

// ── File ─────────────────────────────────────────────────────────────

/// One JSON file on disk. Created owner-only on unix since it holds a
/// bearer token.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/hb-auth-session.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{SESSION_KEY}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(None),
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(e)),
        }
    }

    fn save(&self, raw: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        write_private(&self.path, raw).map_err(|e| self.io_err(e))?;
        debug!(path = %self.path.display(), "session persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "session file removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

#[cfg(unix)]
fn write_private(path: &Path, raw: &str) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(raw.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, raw: &str) -> io::Result<()> {
    std::fs::write(path, raw)
}
