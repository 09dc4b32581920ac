//! store
//!
//! Revisioned key-value storage.
//!
//! # Architecture
//!
//! Commands run against the [`KvStore`] trait, never a concrete backend.
//! Two backends ship with the crate:
//!
//! - [`MemoryStore`]: process-local, also the deterministic test store
//! - [`FileStore`]: JSON file at `~/.teamkv/store.json` by default
//!
//! Both share [`Table`], which owns the revision and tombstone rules, so
//! they cannot drift apart. Other engines implement [`KvStore`] directly.
//!
//! # Provider Selection
//!
//! ```
//! use teamkv::store::create_store;
//!
//! let store = create_store("memory", None).unwrap();
//! assert_eq!(store.name(), "memory");
//! assert!(create_store("redis", None).is_err());
//! ```

mod file;
mod memory;
mod table;
mod traits;

pub use file::FileStore;
pub use memory::{FailOn, MemoryStore, StoreOperation};
pub use table::Table;
pub use traits::{EntryKeyRow, KvStore, StoreError, WriteResult};

use std::path::Path;

/// Valid store provider names.
pub fn valid_store_names() -> &'static [&'static str] {
    &["memory", "file"]
}

/// The default store provider name.
pub const DEFAULT_PROVIDER: &str = "memory";

/// Create a store based on the provider name.
///
/// `path` only applies to the `"file"` provider; `None` selects the default
/// location.
///
/// # Errors
///
/// - Unknown provider name
/// - The default file location cannot be determined
pub fn create_store(provider: &str, path: Option<&Path>) -> Result<Box<dyn KvStore>, StoreError> {
    match provider {
        "memory" => Ok(Box::new(MemoryStore::new())),
        "file" => match path {
            Some(path) => Ok(Box::new(FileStore::with_path(path.to_path_buf()))),
            None => Ok(Box::new(FileStore::new()?)),
        },
        other => Err(StoreError::Unavailable(format!(
            "unknown store provider: '{}' (valid: {})",
            other,
            valid_store_names().join(", ")
        ))),
    }
}
