//! store::traits
//!
//! Storage contract for the revisioned key-value store.
//!
//! # Design
//!
//! The `KvStore` trait is async because real backends sit behind network
//! I/O. All methods return `Result` so backend failures reach the
//! dispatcher, which renders them to the channel instead of aborting.
//!
//! # Revision semantics
//!
//! Every implementation must uphold:
//!
//! - The first accepted write of a key produces [`Revision::FIRST`].
//! - Every accepted put or delete advances the revision by exactly one.
//! - A supplied revision must equal the current revision for the mutation to
//!   apply. An entry that was never written is at [`Revision::ABSENT`].
//! - Delete leaves a tombstone carrying the revision of the delete. A later
//!   put continues from there, so revisions are never reused.
//! - Deleting an absent or already deleted entry fails.
//! - Listings only report live keys, and only namespaces holding one.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{Entry, EntryKey, Namespace, Revision};

/// Errors from storage operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A conditional write named a revision that is no longer current.
    #[error(
        "revision conflict on {namespace}/{key}: expected revision {expected}, \
         but the current revision is {current}"
    )]
    RevisionConflict {
        namespace: Namespace,
        key: EntryKey,
        expected: Revision,
        current: Revision,
    },

    /// Delete of an entry that was never written.
    #[error("{namespace}/{key} does not exist")]
    EntryNotFound { namespace: Namespace, key: EntryKey },

    /// Delete of an entry that is already a tombstone.
    #[error("{namespace}/{key} was already deleted in revision {revision}")]
    AlreadyDeleted {
        namespace: Namespace,
        key: EntryKey,
        revision: Revision,
    },

    /// The entry's revision counter cannot advance any further.
    #[error("{namespace}/{key} has reached the last revision {revision}")]
    RevisionExhausted {
        namespace: Namespace,
        key: EntryKey,
        revision: Revision,
    },

    /// The backend could not be reached or failed internally.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A key returned by [`KvStore::list_entry_keys`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryKeyRow {
    pub entry_key: EntryKey,
    pub revision: Revision,
}

/// Result of an accepted put or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    pub entry_key: EntryKey,
    /// Revision after the write.
    pub revision: Revision,
}

/// The storage contract the dispatcher runs commands against.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a store can be shared with the
/// service task.
///
/// # Example
///
/// ```
/// use teamkv::core::types::{EntryKey, Namespace, Revision};
/// use teamkv::store::{KvStore, MemoryStore, StoreError};
///
/// # tokio_test::block_on(async {
/// let store = MemoryStore::new();
/// let ns = Namespace::new("cfg").unwrap();
/// let key = EntryKey::new("retries").unwrap();
///
/// let first = store.put("team", &ns, &key, "3", None).await.unwrap();
/// assert_eq!(first.revision, Revision::new(1));
///
/// let stale = store.put("team", &ns, &key, "4", Some(Revision::new(0))).await;
/// assert!(matches!(stale, Err(StoreError::RevisionConflict { .. })));
/// # });
/// ```
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Backend name (e.g., "memory", "file").
    fn name(&self) -> &'static str;

    /// List the team's namespaces that hold at least one live key, sorted.
    async fn list_namespaces(&self, team: &str) -> Result<Vec<Namespace>, StoreError>;

    /// List live keys in a namespace, sorted.
    ///
    /// An unknown namespace yields an empty list, not an error.
    async fn list_entry_keys(
        &self,
        team: &str,
        namespace: &Namespace,
    ) -> Result<Vec<EntryKeyRow>, StoreError>;

    /// Read one entry. Never-written entries come back as `EntryState::Absent`.
    async fn get(
        &self,
        team: &str,
        namespace: &Namespace,
        key: &EntryKey,
    ) -> Result<Entry, StoreError>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// - `RevisionConflict` if `revision` is given and not current; the entry
    ///   is left unchanged
    async fn put(
        &self,
        team: &str,
        namespace: &Namespace,
        key: &EntryKey,
        value: &str,
        revision: Option<Revision>,
    ) -> Result<WriteResult, StoreError>;

    /// Tombstone an entry.
    ///
    /// # Errors
    ///
    /// - `EntryNotFound` if the entry was never written
    /// - `AlreadyDeleted` if the entry is a tombstone
    /// - `RevisionConflict` if `revision` is given and not current
    async fn delete(
        &self,
        team: &str,
        namespace: &Namespace,
        key: &EntryKey,
        revision: Option<Revision>,
    ) -> Result<WriteResult, StoreError>;
}
