//! Persistence keys and the file-backed key-value store.
//!
//! ## File Layout
//!
//! The whole key space lives in one JSON object, rewritten on every `set`:
//!
//! ```text
//! {
//!   "achievements": "[{\"id\":...}]",
//!   "consecutiveDays": "3",
//!   "gearItems": "[{\"id\":...}]",
//!   "hasCompletedOnboarding": "true",
//!   ...
//! }
//! ```

use packflow_core::kv::{KeyValueStore, KvError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Keys under which each collection and counter is stored
pub mod keys {
    /// Gear catalog (JSON array of gear items)
    pub const GEAR_ITEMS: &str = "gearItems";
    /// Active flows (JSON array)
    pub const ACTIVE_FLOWS: &str = "activeFlows";
    /// Flow templates (JSON array)
    pub const TEMPLATES: &str = "templates";
    /// Achievement records (JSON array)
    pub const ACHIEVEMENTS: &str = "achievements";
    /// Last calendar day the app was used (JSON date)
    pub const LAST_ACTIVE_DATE: &str = "lastActiveDate";
    /// Consecutive active days (integer)
    pub const CONSECUTIVE_DAYS: &str = "consecutiveDays";
    /// Confirmed scans (integer)
    pub const SCAN_COUNT: &str = "scanCount";
    /// Onboarding flag (boolean)
    pub const HAS_COMPLETED_ONBOARDING: &str = "hasCompletedOnboarding";
}

/// Key-value store persisted to a single JSON file.
///
/// The file is read once on [`FileKeyValueStore::open`]; afterwards the
/// in-memory map is authoritative and every write rewrites the file via a
/// `.tmp` sibling and a rename.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileKeyValueStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file starts empty. An unreadable or corrupt file is logged
    /// and also starts empty; it is replaced on the next write.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::Io`] if the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| KvError::Io(e.to_string()))?;
        }

        let values = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|error| {
                tracing::warn!(path = %path.display(), %error, "Ignoring corrupt data file");
                BTreeMap::new()
            }),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "Ignoring unreadable data file");
                BTreeMap::new()
            },
        };

        tracing::debug!(path = %path.display(), keys = values.len(), "Opened data file");

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| KvError::Unavailable("data file lock poisoned".to_string()))
    }

    /// Atomically write the whole map via a `.tmp` sibling.
    fn flush(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let data = serde_json::to_vec_pretty(values)
            .map_err(|e| KvError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, data).map_err(|e| KvError::Io(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| KvError::Io(e.to_string()))?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).map(|value| value.clone().into_bytes()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(value)
            .map_err(|e| KvError::Serialization(format!("value for {key} is not UTF-8: {e}")))?;

        let mut values = self.lock()?;
        values.insert(key.to_string(), text.to_string());
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.lock()?;
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }
}
