use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};
use uuid::Uuid;

use super::SessionStorage;

/// Stores the session slots as one JSON object in a file.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash never leaves one slot updated and the other stale.
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

type Slots = BTreeMap<String, String>;

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Slots, String> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Slots::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                format!(
                    "Session file {} is not valid JSON: {}",
                    self.path.display(),
                    e
                )
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Slots::new()),
            Err(e) => Err(format!(
                "Failed to read session file {}: {}",
                self.path.display(),
                e
            )),
        }
    }

    /// Read for modification; an unreadable file is replaced, not merged.
    fn read_for_update(&self) -> Slots {
        self.read().unwrap_or_else(|e| {
            warn!("{}; starting from an empty session file", e);
            Slots::new()
        })
    }

    /// A sibling of the session file that no other writer, in this
    /// process or another one, will pick.
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "session".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()))
    }

    fn write(&self, slots: &Slots) -> Result<(), String> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }

        let serialized = serde_json::to_string_pretty(slots)
            .map_err(|e| format!("Failed to serialize session slots: {}", e))?;
        let tmp = self.temp_path();
        fs::write(&tmp, serialized)
            .map_err(|e| format!("Failed to write {}: {}", tmp.display(), e))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            format!(
                "Failed to move {} to {}: {}",
                tmp.display(),
                self.path.display(),
                e
            )
        })?;
        debug!("Wrote {} session slot(s) to {}", slots.len(), self.path.display());
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, slot: &str) -> Result<Option<String>, String> {
        Ok(self.read()?.remove(slot))
    }

    fn put(&self, entries: &[(&str, &str)]) -> Result<(), String> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut slots = self.read_for_update();
        for (slot, value) in entries {
            slots.insert(slot.to_string(), value.to_string());
        }
        self.write(&slots)
    }

    fn remove(&self, slots: &[&str]) -> Result<(), String> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut stored = self.read_for_update();
        for slot in slots {
            stored.remove(*slot);
        }
        if stored.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(format!(
                    "Failed to remove session file {}: {}",
                    self.path.display(),
                    e
                )),
            };
        }
        self.write(&stored)
    }
}
