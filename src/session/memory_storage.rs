use std::collections::HashMap;
use std::sync::Mutex;

use super::SessionStorage;

/// Storage that lives as long as the process. Used by tests and by hosts
/// that keep their own persistence.
#[derive(Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, slot: &str) -> Result<Option<String>, String> {
        Ok(self.slots().get(slot).cloned())
    }

    fn put(&self, entries: &[(&str, &str)]) -> Result<(), String> {
        let mut slots = self.slots();
        for (slot, value) in entries {
            slots.insert(slot.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove(&self, slots: &[&str]) -> Result<(), String> {
        let mut stored = self.slots();
        for slot in slots {
            stored.remove(*slot);
        }
        Ok(())
    }
}
