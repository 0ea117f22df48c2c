// Key-value byte stores backing the persistence adapter

use crate::error::PersistenceError;
use crate::models::now_ms;
use fs2::FileExt;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// External byte-oriented key-value store
///
/// `put` replaces any previous value for the key.
pub trait KvStore {
    /// Read the value stored under `key`, or `None` if the key is absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    /// Write `value` under `key`, replacing any prior value
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), PersistenceError>;
}

/// Validate a store key
///
/// Keys become file names for [`FileKv`], so they are restricted to
/// alphanumerics, `_` and `-`.
pub fn validate_key(key: &str) -> Result<(), PersistenceError> {
    let reason = if key.is_empty() {
        "key cannot be empty"
    } else if key.len() > 64 {
        "key too long (max 64 chars)"
    } else if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        "key must be alphanumeric with _/-"
    } else {
        return Ok(());
    };

    Err(PersistenceError::InvalidKey {
        key: key.to_string(),
        reason,
    })
}

// ========================================================================
// In-memory
// ========================================================================

/// Volatile store, mostly useful in tests and demos
#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

// ========================================================================
// File per key
// ========================================================================

/// Directory-backed store holding one `{key}.json` file per key
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    /// Open (creating if needed) a file store rooted at `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, PersistenceError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| PersistenceError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        validate_key(key)?;
        let path = self.path_for(key);

        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::io(path, e)),
        }
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        validate_key(key)?;
        let path = self.path_for(key);
        let lock_path = self.dir.join(format!("{}.lock", key));
        let tmp_path = self.dir.join(format!("{}.json.tmp", key));

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| PersistenceError::io(&lock_path, e))?;

        // Held until lock_file is dropped at the end of this call
        lock_file.lock_exclusive().map_err(|source| PersistenceError::Lock {
            path: lock_path.clone(),
            source,
        })?;

        let written = write_synced(&tmp_path, value)
            .map_err(|e| PersistenceError::io(&tmp_path, e))
            .and_then(|()| fs::rename(&tmp_path, &path).map_err(|e| PersistenceError::io(&path, e)));
        if let Err(e) = written {
            // Leave no partial tmp file behind
            match fs::remove_file(&tmp_path) {
                Err(rm) if rm.kind() != ErrorKind::NotFound => {
                    warn!(path = ?tmp_path, error = %rm, "Failed to remove temp file");
                }
                _ => {}
            }
            return Err(e);
        }

        debug!(path = ?path, bytes = value.len(), "Wrote key to file store");
        Ok(())
    }
}

fn write_synced(path: &Path, value: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(value)?;
    file.sync_all()
}

// ========================================================================
// SQLite
// ========================================================================

/// Store backed by a single SQLite table
pub struct SqliteKv {
    db: Connection,
}

impl SqliteKv {
    /// Open or create a SQLite database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let db = Connection::open(path)?;
        Self::with_connection(db)
    }

    /// In-memory SQLite database
    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(db: Connection) -> Result<Self, PersistenceError> {
        debug!("Creating kv schema");
        db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(Self { db })
    }

    pub fn db(&self) -> &Connection {
        &self.db
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        let value = self
            .db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get::<_, Vec<u8>>(0))
            .optional()?;
        Ok(value)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        validate_key(key)?;
        self.db.execute(
            "INSERT OR REPLACE INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, now_ms()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_key() {
        // Valid
        assert!(validate_key("todos").is_ok());
        assert!(validate_key("work-list_2").is_ok());

        // Invalid
        assert!(validate_key("").is_err());
        assert!(validate_key("../todos").is_err());
        assert!(validate_key(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_memory_kv_get_put() {
        let mut kv = MemoryKv::new();
        assert_eq!(kv.get("todos").unwrap(), None);

        kv.put("todos", b"first").unwrap();
        kv.put("todos", b"second").unwrap();
        assert_eq!(kv.get("todos").unwrap(), Some(b"second".to_vec()));
    }

    #[test]
    fn test_file_kv_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested/store");

        let kv = FileKv::open(&dir).unwrap();
        assert!(dir.exists());
        assert_eq!(kv.dir(), dir.as_path());
    }

    #[test]
    fn test_file_kv_missing_key() {
        let temp = TempDir::new().unwrap();
        let kv = FileKv::open(temp.path()).unwrap();

        assert_eq!(kv.get("todos").unwrap(), None);
    }

    #[test]
    fn test_file_kv_overwrite() {
        let temp = TempDir::new().unwrap();
        let mut kv = FileKv::open(temp.path()).unwrap();

        kv.put("todos", b"[1]").unwrap();
        kv.put("todos", b"[1,2]").unwrap();

        assert_eq!(kv.get("todos").unwrap(), Some(b"[1,2]".to_vec()));
        assert_eq!(fs::read(kv.path_for("todos")).unwrap(), b"[1,2]");
        assert!(!temp.path().join("todos.json.tmp").exists());
    }

    #[test]
    fn test_file_kv_failed_rename_removes_tmp() {
        let temp = TempDir::new().unwrap();
        let mut kv = FileKv::open(temp.path()).unwrap();

        // A non-empty directory where the file should go makes the rename fail
        let target = kv.path_for("todos");
        fs::create_dir_all(target.join("blocker")).unwrap();

        let err = kv.put("todos", b"[1]").unwrap_err();
        assert!(matches!(err, PersistenceError::Io { .. }));
        assert!(!temp.path().join("todos.json.tmp").exists());
        assert!(target.is_dir());
    }

    #[test]
    fn test_file_kv_rejects_path_keys() {
        let temp = TempDir::new().unwrap();
        let mut kv = FileKv::open(temp.path()).unwrap();

        let err = kv.put("../escape", b"x").unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidKey { .. }));
    }

    #[test]
    fn test_sqlite_kv_get_put() {
        let temp = TempDir::new().unwrap();
        let mut kv = SqliteKv::open(temp.path().join("todos.db")).unwrap();

        assert_eq!(kv.get("todos").unwrap(), None);
        kv.put("todos", b"one").unwrap();
        kv.put("todos", b"two").unwrap();
        assert_eq!(kv.get("todos").unwrap(), Some(b"two".to_vec()));

        let rows: i64 = kv.db().query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0)).unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_sqlite_kv_persists_across_connections() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("todos.db");

        {
            let mut kv = SqliteKv::open(&db_path).unwrap();
            kv.put("todos", b"kept").unwrap();
        }

        let kv = SqliteKv::open(&db_path).unwrap();
        assert_eq!(kv.get("todos").unwrap(), Some(b"kept".to_vec()));
    }
}
