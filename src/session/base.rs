use std::sync::Arc;

use tracing::{info, warn};

use super::{file_storage::FileStorage, memory_storage::MemoryStorage, no_storage::NoStorage};
use crate::config::{StorageBackend, StorageConfig};

/// Slot holding the raw credential.
pub const CREDENTIAL_SLOT: &str = "authToken";
/// Slot holding the JSON-encoded identity derived from the credential.
pub const IDENTITY_SLOT: &str = "user";

/// Durable key-value storage for the session slots.
///
/// `put` and `remove` take every slot of one transition at once; backends
/// must apply them together so the two slots never disagree.
pub trait SessionStorage: Send + Sync {
    fn get(&self, slot: &str) -> Result<Option<String>, String>;
    fn put(&self, entries: &[(&str, &str)]) -> Result<(), String>;
    fn remove(&self, slots: &[&str]) -> Result<(), String>;
    fn is_enabled(&self) -> bool {
        // Real backends persist; NoStorage returns false so logs can say so.
        true
    }
}

/// Creates the storage backend described by `config`.
/// If `enabled = false`, returns NoStorage.
pub fn create_storage(config: &StorageConfig) -> Arc<dyn SessionStorage> {
    if !config.enabled {
        info!("Session storage is disabled. Sessions will not survive a restart.");
        return Arc::new(NoStorage::new());
    }

    match &config.backend {
        Some(StorageBackend::Memory) => {
            info!("Using in-memory session storage.");
            Arc::new(MemoryStorage::new())
        }
        Some(StorageBackend::File(file)) => {
            info!("Using file session storage at {}", file.path.display());
            Arc::new(FileStorage::new(file.path.clone()))
        }
        None => {
            warn!("Session storage is enabled but no backend is configured, using memory.");
            Arc::new(MemoryStorage::new())
        }
    }
}
