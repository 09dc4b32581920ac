//! core::types
//!
//! Strong types for the key-value domain.
//!
//! # Types
//!
//! - [`Namespace`] - Validated namespace name
//! - [`EntryKey`] - Validated entry key within a namespace
//! - [`Revision`] - Per-entry revision counter
//! - [`Entry`] / [`EntryState`] - Current state of a `(namespace, key)` pair
//!
//! # Validation
//!
//! Namespaces and keys arrive as single whitespace-delimited tokens, so they
//! are non-empty and contain no whitespace. The constructors enforce the same
//! rules for values built by hand.
//!
//! # Examples
//!
//! ```
//! use teamkv::core::types::{EntryKey, Namespace, Revision};
//!
//! let ns = Namespace::new("cfg").unwrap();
//! let key = EntryKey::new("retries").unwrap();
//! assert_eq!(format!("{}/{}", ns, key), "cfg/retries");
//!
//! assert!(Namespace::new("").is_err());
//! assert!(EntryKey::new("two words").is_err());
//! assert_eq!(Revision::FIRST.next(), Some(Revision::new(2)));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("invalid entry key: {0}")]
    InvalidEntryKey(String),
}

fn validate_token(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("cannot be empty".into());
    }
    if value.chars().any(char::is_whitespace) {
        return Err(format!("'{}' cannot contain whitespace", value));
    }
    Ok(())
}

/// A validated namespace name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    /// Create a new validated namespace.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidNamespace` if the name is empty or contains whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        validate_token(&name).map_err(TypeError::InvalidNamespace)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Namespace {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Namespace> for String {
    fn from(value: Namespace) -> Self {
        value.0
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated entry key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryKey(String);

impl EntryKey {
    /// Create a new validated entry key.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidEntryKey` if the key is empty or contains whitespace.
    pub fn new(key: impl Into<String>) -> Result<Self, TypeError> {
        let key = key.into();
        validate_token(&key).map_err(TypeError::InvalidEntryKey)?;
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntryKey {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntryKey> for String {
    fn from(value: EntryKey) -> Self {
        value.0
    }
}

impl std::fmt::Display for EntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Revision counter for a single `(namespace, key)` pair.
///
/// An entry that was never written sits at [`Revision::ABSENT`]; the first
/// accepted put moves it to [`Revision::FIRST`]. Every accepted put or delete
/// advances it by exactly one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Revision(u64);

impl Revision {
    /// Revision reported for an entry that has never been written.
    pub const ABSENT: Revision = Revision(0);

    /// Revision assigned by the first accepted write.
    pub const FIRST: Revision = Revision(1);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }

    /// The revision that follows this one, `None` once the counter is
    /// exhausted.
    pub const fn next(&self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }
}

impl From<u64> for Revision {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The state of one entry as reported by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntryState {
    /// Live value at a revision.
    Present { value: String, revision: Revision },
    /// Tombstone retaining the revision of the delete.
    Deleted { revision: Revision },
    /// Never written.
    Absent,
}

impl EntryState {
    /// Current revision, [`Revision::ABSENT`] for entries never written.
    pub fn revision(&self) -> Revision {
        match self {
            EntryState::Present { revision, .. } | EntryState::Deleted { revision } => *revision,
            EntryState::Absent => Revision::ABSENT,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, EntryState::Present { .. })
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, EntryState::Deleted { .. })
    }
}

/// An entry returned by `get`, addressed by namespace and key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub namespace: Namespace,
    pub entry_key: EntryKey,
    pub state: EntryState,
}
