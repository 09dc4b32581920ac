//! store::file
//!
//! JSON-file store.
//!
//! # Storage
//!
//! - `<path>` - the whole [`Table`] as pretty-printed JSON
//! - `<path>.lock` - lock file held with an OS-level exclusive lock for the
//!   duration of each operation
//!
//! # Invariants
//!
//! - Every operation reads the file fresh, so separate processes sharing a
//!   file see each other's writes and the revision check stays meaningful.
//! - Writes are atomic (temp file, sync, rename); a crash leaves either the
//!   old or the new table on disk.
//! - Lock acquisition is non-blocking; a held lock fails fast with
//!   `StoreError::Unavailable`.
//! - File I/O runs on tokio's blocking pool, never on a runtime worker.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tracing::debug;

use super::table::Table;
use super::traits::{EntryKeyRow, KvStore, StoreError, WriteResult};
use crate::core::types::{Entry, EntryKey, Namespace, Revision};

/// File-backed store.
///
/// # Example
///
/// ```no_run
/// use teamkv::store::{FileStore, KvStore};
///
/// let store = FileStore::with_path("/tmp/teamkv/store.json".into());
/// assert_eq!(store.name(), "file");
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

/// Exclusive lock on the store file, released on drop.
struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl FileStore {
    /// Create a file store at the default location, `~/.teamkv/store.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, StoreError> {
        Ok(Self::with_path(Self::default_path()?))
    }

    /// Create a file store at a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// The default store location.
    pub fn default_path() -> Result<PathBuf, StoreError> {
        let home = dirs::home_dir()
            .ok_or_else(|| StoreError::Unavailable("cannot determine home directory".into()))?;
        Ok(home.join(".teamkv").join("store.json"))
    }

    /// Path to the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn lock(&self) -> Result<StoreLock, StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::Unavailable(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        let path = self.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                StoreError::Unavailable(format!("cannot open {}: {}", path.display(), e))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(StoreLock { file }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(StoreError::Unavailable(
                format!("{} is locked by another process", self.path.display()),
            )),
            Err(e) => Err(StoreError::Unavailable(format!(
                "cannot lock {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn read_table(&self) -> Result<Table, StoreError> {
        if !self.path.exists() {
            return Ok(Table::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            StoreError::Unavailable(format!("cannot read {}: {}", self.path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            StoreError::Unavailable(format!("cannot parse {}: {}", self.path.display(), e))
        })
    }

    fn write_table(&self, table: &Table) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(table)
            .map_err(|e| StoreError::Unavailable(format!("cannot serialize store: {}", e)))?;

        let temp_path = self.path.with_extension("json.tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| {
                    StoreError::Unavailable(format!("cannot create temp file: {}", e))
                })?;

            file.write_all(content.as_bytes())
                .map_err(|e| StoreError::Unavailable(format!("cannot write store: {}", e)))?;

            file.sync_all()
                .map_err(|e| StoreError::Unavailable(format!("cannot sync to disk: {}", e)))?;
        }

        fs::rename(&temp_path, &self.path)
            .map_err(|e| StoreError::Unavailable(format!("cannot rename temp file: {}", e)))
    }

    /// Run a read-only closure against the current table under the lock.
    async fn read<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Table) -> T + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        blocking(move || {
            let _lock = store.lock()?;
            let table = store.read_table()?;
            Ok(f(&table))
        })
        .await
    }

    /// Apply a mutation under the lock, persisting only if it succeeds.
    async fn update<F>(&self, f: F) -> Result<WriteResult, StoreError>
    where
        F: FnOnce(&mut Table) -> Result<WriteResult, StoreError> + Send + 'static,
    {
        let store = self.clone();
        blocking(move || {
            let _lock = store.lock()?;
            let mut table = store.read_table()?;
            let result = f(&mut table)?;
            store.write_table(&table)?;
            debug!(path = %store.path.display(), revision = %result.revision, "store written");
            Ok(result)
        })
        .await
    }
}

async fn blocking<T, F>(f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Unavailable(format!("store task failed: {}", e)))?
}

#[async_trait]
impl KvStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn list_namespaces(&self, team: &str) -> Result<Vec<Namespace>, StoreError> {
        let team = team.to_string();
        self.read(move |table| table.list_namespaces(&team)).await
    }

    async fn list_entry_keys(
        &self,
        team: &str,
        namespace: &Namespace,
    ) -> Result<Vec<EntryKeyRow>, StoreError> {
        let (team, namespace) = (team.to_string(), namespace.clone());
        self.read(move |table| table.list_entry_keys(&team, &namespace))
            .await
    }

    async fn get(
        &self,
        team: &str,
        namespace: &Namespace,
        key: &EntryKey,
    ) -> Result<Entry, StoreError> {
        let (team, namespace, key) = (team.to_string(), namespace.clone(), key.clone());
        self.read(move |table| table.get(&team, &namespace, &key))
            .await
    }

    async fn put(
        &self,
        team: &str,
        namespace: &Namespace,
        key: &EntryKey,
        value: &str,
        revision: Option<Revision>,
    ) -> Result<WriteResult, StoreError> {
        let (team, namespace, key) = (team.to_string(), namespace.clone(), key.clone());
        let value = value.to_string();
        self.update(move |table| table.put(&team, &namespace, &key, &value, revision))
            .await
    }

    async fn delete(
        &self,
        team: &str,
        namespace: &Namespace,
        key: &EntryKey,
        revision: Option<Revision>,
    ) -> Result<WriteResult, StoreError> {
        let (team, namespace, key) = (team.to_string(), namespace.clone(), key.clone());
        self.update(move |table| table.delete(&team, &namespace, &key, revision))
            .await
    }
}
