// Session token state and its durable storage.
//
// `Session` is created once by the composition root (see `main.rs`) and
// shared with the client behind an `Arc`. The token is only written through
// `set_token` / `clear`, which also persist the change to the backing
// `TokenStore`.

use anyhow::{Context, Result};
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};

/// Durable storage for the single `access_token` entry.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Stores the token in a plain file, one token per file.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => {
                let token = data.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to read token file {}", self.path.display())),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        std::fs::write(&self.path, token)
            .with_context(|| format!("Failed to write token file {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to remove token file {}", self.path.display())),
        }
    }
}

/// Keeps the token in memory only. Used by tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }

    /// What is currently persisted, independent of any session's view.
    pub fn persisted(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.slot.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock() = None;
        Ok(())
    }
}

// Lets tests keep a handle on the store they hand to the session.
impl<S: TokenStore + ?Sized> TokenStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<String>> {
        (**self).load()
    }

    fn save(&self, token: &str) -> Result<()> {
        (**self).save(token)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// The one bearer token this client holds, if any.
pub struct Session {
    token: RwLock<Option<String>>,
    store: Box<dyn TokenStore>,
}

impl Session {
    /// Start a session from whatever the store has persisted. A store that
    /// cannot be read yields an empty session rather than an error.
    pub fn load(store: impl TokenStore + 'static) -> Self {
        let token = match store.load() {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "could not load persisted token");
                None
            }
        };
        tracing::debug!(has_token = token.is_some(), "session loaded");
        Self {
            token: RwLock::new(token),
            store: Box::new(store),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    /// Replace the held token and persist it. The write lock is held until
    /// the store has been updated, so memory and store never disagree.
    pub fn set_token(&self, token: &str) {
        let mut held = self.token.write();
        *held = Some(token.to_string());
        if let Err(err) = self.store.save(token) {
            tracing::warn!(error = %format!("{err:#}"), "could not persist token");
        }
    }

    /// Drop the held token and its persisted copy.
    pub fn clear(&self) {
        let mut held = self.token.write();
        held.take();
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %format!("{err:#}"), "could not remove persisted token");
        }
    }
}
