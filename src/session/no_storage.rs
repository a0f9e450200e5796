use super::SessionStorage;
use tracing::debug;

/// Storage that persists nothing. The session still works in memory
/// but is gone after a restart.
pub struct NoStorage;

impl NoStorage {
    pub fn new() -> Self {
        NoStorage
    }
}

impl Default for NoStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStorage for NoStorage {
    fn get(&self, _slot: &str) -> Result<Option<String>, String> {
        Ok(None)
    }

    fn put(&self, entries: &[(&str, &str)]) -> Result<(), String> {
        debug!("Session storage disabled, not persisting {} slot(s)", entries.len());
        Ok(())
    }

    fn remove(&self, _slots: &[&str]) -> Result<(), String> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
