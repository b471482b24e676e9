//! Durable storage for the bound workspace name.
//!
//! Only the name is ever written. Passwords and tokens stay in memory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Errors from reading or writing the persisted name.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The state file could not be read, written or removed.
    #[error("state file {path}: {source}")]
    Io {
        /// File that was accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The state file exists but is not valid TOML.
    #[error("failed to parse state file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The state could not be encoded.
    #[error("failed to encode state file: {0}")]
    Encode(#[from] toml::ser::Error),

    /// No per-user data directory is available for the default path.
    #[error("could not determine data directory (no HOME or XDG_DATA_HOME)")]
    NoDataDir,
}

/// Storage for the single persisted field: the bound workspace name.
pub trait NameStore: Send + Sync {
    /// Reads the stored name, if any.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the backing store cannot be read.
    fn load(&self) -> Result<Option<String>, PersistError>;

    /// Replaces the stored name.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the backing store cannot be written.
    fn save(&self, name: &str) -> Result<(), PersistError>;

    /// Removes the stored name. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError`] if the backing store cannot be written.
    fn clear(&self) -> Result<(), PersistError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    workspace: Option<String>,
}

/// [`NameStore`] backed by a small TOML file.
#[derive(Debug, Clone)]
pub struct FileNameStore {
    path: PathBuf,
}

impl FileNameStore {
    /// Uses the state file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default state file location: `<data dir>/taskdeck/state.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::NoDataDir`] if the platform has no data dir.
    pub fn default_path() -> Result<PathBuf, PersistError> {
        dirs::data_dir()
            .map(|dir| dir.join("taskdeck").join("state.toml"))
            .ok_or(PersistError::NoDataDir)
    }

    /// Returns the state file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl NameStore for FileNameStore {
    fn load(&self) -> Result<Option<String>, PersistError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        let state: StateFile = toml::from_str(&contents)?;
        Ok(state.workspace.filter(|name| !name.is_empty()))
    }

    fn save(&self, name: &str) -> Result<(), PersistError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }
        let contents = toml::to_string(&StateFile {
            workspace: Some(name.to_string()),
        })?;
        std::fs::write(&self.path, contents).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), PersistError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// [`NameStore`] held in memory. Clones share the stored name.
#[derive(Debug, Clone, Default)]
pub struct MemoryNameStore(Arc<Mutex<Option<String>>>);

impl MemoryNameStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `name`, as after a previous run.
    pub fn holding(name: impl Into<String>) -> Self {
        Self(Arc::new(Mutex::new(Some(name.into()))))
    }

    /// Returns the stored name without going through the trait.
    #[must_use]
    pub fn peek(&self) -> Option<String> {
        self.0.lock().clone()
    }
}

impl NameStore for MemoryNameStore {
    fn load(&self) -> Result<Option<String>, PersistError> {
        Ok(self.peek())
    }

    fn save(&self, name: &str) -> Result<(), PersistError> {
        *self.0.lock() = Some(name.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistError> {
        *self.0.lock() = None;
        Ok(())
    }
}
