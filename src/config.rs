// Store location and backend configuration

use crate::error::{ParseValueError, PersistenceError};
use crate::kv::{FileKv, SqliteKv};
use crate::persistence::{DEFAULT_KEY, Persistence};
use crate::store::TaskStore;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Name of the directory created under the configured base path
pub const STORE_DIR: &str = ".todostore";

/// Which key-value backend holds the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// One JSON file per key
    #[default]
    File,
    /// A `kv` table in `todostore.db`
    Sqlite,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::File => write!(f, "file"),
            Backend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for Backend {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Backend::File),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(ParseValueError::new("backend", other, "file, sqlite")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the store files (`<base>/.todostore`)
    pub dir: PathBuf,
    /// Entry key the collection is saved under
    pub key: String,
    pub backend: Backend,
}

impl StoreConfig {
    /// Configuration for a store under `base`, with the default key and file backend
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        Self {
            dir: base.as_ref().join(STORE_DIR),
            key: DEFAULT_KEY.to_string(),
            backend: Backend::default(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Platform data directory, or the current directory when there is none
    pub fn default_base() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("todostore"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Open the configured directory as a file-backed store
    pub fn open_file(&self) -> Result<TaskStore<FileKv>, PersistenceError> {
        let kv = FileKv::open(&self.dir)?;
        debug!(dir = ?self.dir, key = %self.key, "Opening file-backed store");
        Ok(TaskStore::open(Persistence::with_key(kv, self.key.clone())?))
    }

    /// Open `todostore.db` in the configured directory as a SQLite-backed store
    pub fn open_sqlite(&self) -> Result<TaskStore<SqliteKv>, PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(|e| PersistenceError::io(&self.dir, e))?;
        let db_path = self.dir.join("todostore.db");
        debug!(db = ?db_path, key = %self.key, "Opening SQLite-backed store");
        let kv = SqliteKv::open(&db_path)?;
        Ok(TaskStore::open(Persistence::with_key(kv, self.key.clone())?))
    }
}
