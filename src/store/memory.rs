//! store::memory
//!
//! In-memory store.
//!
//! # Design
//!
//! Backs the bot when no persistent backend is configured and doubles as the
//! deterministic store for tests. Entries live in a shared [`Table`]; clones
//! share state. Failure scenarios can be injected with [`FailOn`] and every
//! call is recorded as a [`StoreOperation`] for verification.
//!
//! # Example
//!
//! ```
//! use teamkv::core::types::{EntryKey, EntryState, Namespace};
//! use teamkv::store::{KvStore, MemoryStore};
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::new();
//! let ns = Namespace::new("cfg").unwrap();
//! let key = EntryKey::new("retries").unwrap();
//!
//! store.put("team", &ns, &key, "3", None).await.unwrap();
//! let entry = store.get("team", &ns, &key).await.unwrap();
//! assert!(entry.state.is_present());
//! # });
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::table::Table;
use super::traits::{EntryKeyRow, KvStore, StoreError, WriteResult};
use crate::core::types::{Entry, EntryKey, Namespace, Revision};

/// In-memory store. Thread-safe via internal `Arc<Mutex<...>>`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    table: Table,
    fail_on: Option<FailOn>,
    operations: Vec<StoreOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    ListNamespaces(StoreError),
    ListEntryKeys(StoreError),
    Get(StoreError),
    Put(StoreError),
    Delete(StoreError),
    /// Fail every operation with the given error.
    All(StoreError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
    ListNamespaces {
        team: String,
    },
    ListEntryKeys {
        team: String,
        namespace: Namespace,
    },
    Get {
        team: String,
        namespace: Namespace,
        key: EntryKey,
    },
    Put {
        team: String,
        namespace: Namespace,
        key: EntryKey,
        value: String,
        revision: Option<Revision>,
    },
    Delete {
        team: String,
        namespace: Namespace,
        key: EntryKey,
        revision: Option<Revision>,
    },
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the store to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use teamkv::store::{FailOn, MemoryStore, StoreError};
    ///
    /// let store = MemoryStore::new()
    ///     .fail_on(FailOn::Put(StoreError::Unavailable("backend down".into())));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<StoreOperation> {
        self.lock().operations.clone()
    }

    /// Snapshot of the current table.
    pub fn table(&self) -> Table {
        self.lock().table.clone()
    }

    // Every mutation is a single insert, so a poisoned table is still consistent.
    fn lock(&self) -> MutexGuard<'_, MemoryStoreInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record an operation and return the injected failure for it, if any.
    fn begin(&self, op: StoreOperation) -> Result<MutexGuard<'_, MemoryStoreInner>, StoreError> {
        let mut inner = self.lock();
        let injected = match (&inner.fail_on, &op) {
            (Some(FailOn::All(e)), _)
            | (Some(FailOn::ListNamespaces(e)), StoreOperation::ListNamespaces { .. })
            | (Some(FailOn::ListEntryKeys(e)), StoreOperation::ListEntryKeys { .. })
            | (Some(FailOn::Get(e)), StoreOperation::Get { .. })
            | (Some(FailOn::Put(e)), StoreOperation::Put { .. })
            | (Some(FailOn::Delete(e)), StoreOperation::Delete { .. }) => Some(e.clone()),
            _ => None,
        };
        inner.operations.push(op);
        match injected {
            Some(e) => Err(e),
            None => Ok(inner),
        }
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_namespaces(&self, team: &str) -> Result<Vec<Namespace>, StoreError> {
        let inner = self.begin(StoreOperation::ListNamespaces {
            team: team.to_string(),
        })?;
        Ok(inner.table.list_namespaces(team))
    }

    async fn list_entry_keys(
        &self,
        team: &str,
        namespace: &Namespace,
    ) -> Result<Vec<EntryKeyRow>, StoreError> {
        let inner = self.begin(StoreOperation::ListEntryKeys {
            team: team.to_string(),
            namespace: namespace.clone(),
        })?;
        Ok(inner.table.list_entry_keys(team, namespace))
    }

    async fn get(
        &self,
        team: &str,
        namespace: &Namespace,
        key: &EntryKey,
    ) -> Result<Entry, StoreError> {
        let inner = self.begin(StoreOperation::Get {
            team: team.to_string(),
            namespace: namespace.clone(),
            key: key.clone(),
        })?;
        Ok(inner.table.get(team, namespace, key))
    }

    async fn put(
        &self,
        team: &str,
        namespace: &Namespace,
        key: &EntryKey,
        value: &str,
        revision: Option<Revision>,
    ) -> Result<WriteResult, StoreError> {
        let mut inner = self.begin(StoreOperation::Put {
            team: team.to_string(),
            namespace: namespace.clone(),
            key: key.clone(),
            value: value.to_string(),
            revision,
        })?;
        inner.table.put(team, namespace, key, value, revision)
    }

    async fn delete(
        &self,
        team: &str,
        namespace: &Namespace,
        key: &EntryKey,
        revision: Option<Revision>,
    ) -> Result<WriteResult, StoreError> {
        let mut inner = self.begin(StoreOperation::Delete {
            team: team.to_string(),
            namespace: namespace.clone(),
            key: key.clone(),
            revision,
        })?;
        inner.table.delete(team, namespace, key, revision)
    }
}
