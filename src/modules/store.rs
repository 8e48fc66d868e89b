use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::modules::error::StoreError;
use crate::modules::user::UserRecord;

pub const LEDGER_FILE: &str = "economy.json";

/// Every registered user keyed by sender id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub users: HashMap<String, UserRecord>,
}

impl Ledger {
    pub fn get(&self, id: &str) -> Option<&UserRecord> {
        self.users.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut UserRecord> {
        self.users.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.users.contains_key(id)
    }

    pub fn upsert(&mut self, record: UserRecord) {
        self.users.insert(record.id.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Held for one load -> mutate -> save cycle; dropping it releases the lock.
#[derive(Debug, Default)]
pub struct CycleLock {
    _file: Option<File>,
}

/// Keyed read/modify/write contract the engine persists through.
pub trait EconomyStore: Send + Sync {
    /// Exclude other processes sharing the same backing data until the
    /// returned guard drops. In-process callers still need their own mutex.
    fn lock_cycle(&self) -> Result<CycleLock, StoreError> {
        Ok(CycleLock::default())
    }

    fn load_all(&self) -> Result<Ledger, StoreError>;

    fn save_all(&self, ledger: &Ledger) -> Result<(), StoreError>;

    fn get(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.load_all()?.users.remove(id))
    }

    fn upsert(&self, record: UserRecord) -> Result<(), StoreError> {
        let mut ledger = self.load_all()?;
        ledger.upsert(record);
        self.save_all(&ledger)
    }
}

/// Pretty-printed JSON file holding the whole ledger.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(LEDGER_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sidecar file the advisory lock is taken on; the ledger itself gets
    /// replaced by rename on every save, so it can't carry the lock.
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn ensure_parent(&self) -> Result<&Path, StoreError> {
        match self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|e| self.io_err(e))?;
                Ok(dir)
            }
            None => Ok(Path::new(".")),
        }
    }
}

impl EconomyStore for JsonFileStore {
    fn lock_cycle(&self) -> Result<CycleLock, StoreError> {
        self.ensure_parent()?;
        let lock_path = self.lock_path();
        let lock_err = |source| StoreError::Io {
            path: lock_path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(lock_err)?;
        file.lock_exclusive().map_err(lock_err)?;
        Ok(CycleLock { _file: Some(file) })
    }

    fn load_all(&self) -> Result<Ledger, StoreError> {
        if !self.path.exists() {
            return Ok(Ledger::default());
        }

        let data = fs::read(&self.path).map_err(|e| self.io_err(e))?;
        if data.is_empty() {
            return Ok(Ledger::default());
        }

        serde_json::from_slice(&data).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Write to a temp file beside the ledger, then rename over it, so a
    /// reader never sees a half-written file.
    fn save_all(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let dir = self.ensure_parent()?;
        let json = serde_json::to_vec_pretty(ledger)?;

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.io_err(e))?;
        temp.write_all(&json).map_err(|e| self.io_err(e))?;
        temp.persist(&self.path).map_err(|e| self.io_err(e.error))?;
        Ok(())
    }
}

/// In-process store; loads hand out clones so callers can't skip `save_all`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ledger: Mutex<Ledger>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EconomyStore for MemoryStore {
    fn load_all(&self) -> Result<Ledger, StoreError> {
        Ok(self.ledger.lock().clone())
    }

    fn save_all(&self, ledger: &Ledger) -> Result<(), StoreError> {
        *self.ledger.lock() = ledger.clone();
        Ok(())
    }
}
