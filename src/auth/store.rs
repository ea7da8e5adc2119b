//! Durable bearer token storage

use crate::error::{Error, Result};
use parking_lot::RwLock;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Holds the single opaque bearer token.
///
/// The `try_*` methods surface storage failures as [`Error::StorageUnavailable`].
/// The lenient methods never fail: reads degrade to absent, writes are best effort.
pub trait TokenStore: Send + Sync {
    fn try_current(&self) -> Result<Option<String>>;

    /// Saving an empty token clears the store; an empty string is never a token
    fn try_save(&self, token: &str) -> Result<()>;

    /// Removing an already-empty store succeeds
    fn try_clear(&self) -> Result<()>;

    fn current(&self) -> Option<String> {
        self.try_current().unwrap_or_else(|e| {
            warn!("Token read failed, treating as absent: {}", e);
            None
        })
    }

    fn save(&self, token: &str) {
        if let Err(e) = self.try_save(token) {
            warn!("Token write failed: {}", e);
        }
    }

    fn clear(&self) {
        if let Err(e) = self.try_clear() {
            warn!("Token removal failed: {}", e);
        }
    }
}

/// Process-local store, used by tests and embedders without durable storage
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into()).filter(|t: &String| !t.is_empty())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn try_current(&self) -> Result<Option<String>> {
        Ok(self.token.read().clone())
    }

    fn try_save(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return self.try_clear();
        }
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn try_clear(&self) -> Result<()> {
        self.token.write().take();
        Ok(())
    }
}

/// Store backed by one file named after the token key
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(key),
        }
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(&config.storage.dir, &config.storage.token_key)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn unavailable(path: &Path, err: std::io::Error) -> Error {
    Error::StorageUnavailable(format!("{}: {}", path.display(), err))
}

impl TokenStore for FileTokenStore {
    fn try_current(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.is_empty() => Ok(None),
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable(&self.path, e)),
        }
    }

    fn try_save(&self, token: &str) -> Result<()> {
        if token.is_empty() {
            return self.try_clear();
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| unavailable(parent, e))?;
        }
        fs::write(&self.path, token).map_err(|e| unavailable(&self.path, e))?;
        debug!("Token saved to {}", self.path.display());
        Ok(())
    }

    fn try_clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Token removed from {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(unavailable(&self.path, e)),
        }
    }
}
