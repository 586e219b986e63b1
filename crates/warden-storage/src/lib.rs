//! # warden-storage
//!
//! Reference implementations of the [`IStore`] contract.
//!
//! - [`MemoryStore`]: lock-sharded in-process map, for tests and ephemeral deployments
//! - [`SqliteStore`]: single-file SQLite table, for durable single-node deployments

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use warden_core::config::{StorageBackend, StorageConfig};
use warden_core::errors::WardenResult;
use warden_core::traits::IStore;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Open the store selected by configuration.
pub fn open_store(config: &StorageConfig) -> WardenResult<Arc<dyn IStore>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StorageBackend::Sqlite => {
            let path = config.resolved_db_path();
            let store = SqliteStore::open(&path, config.busy_timeout_ms)?;
            Ok(Arc::new(store))
        }
    }
}

/// `true` when `key` belongs to `namespace` (`namespace/...`).
pub(crate) fn in_namespace(key: &str, namespace: &str) -> bool {
    key.strip_prefix(namespace)
        .is_some_and(|rest| rest.starts_with('/'))
}
