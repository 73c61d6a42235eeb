//! Key-value storage collaborator
//!
//! PackFlow persists each collection wholesale under a single string key.
//! The [`KeyValueStore`] trait is the only persistence seam; reducers reach it
//! through their environment and write synchronously after every mutation so
//! that writes stay ordered with the state changes that produced them.
//!
//! Integer and boolean values are stored as their decimal / `true`/`false`
//! text, and read back with the defaults of the platform preference stores
//! they model (0 and `false` for missing or unreadable values).

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Result type for key-value operations
pub type Result<T> = std::result::Result<T, KvError>;

/// Errors that can occur while talking to a key-value store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KvError {
    /// The backing medium could not be read or written
    #[error("Storage I/O failed: {0}")]
    Io(String),

    /// A value could not be encoded or decoded
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The store is not available (locked, closed, misconfigured)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// String-keyed byte storage, durable across process restarts.
///
/// # Example
///
/// ```ignore
/// let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryKeyValueStore::new());
/// kv.set_int("scanCount", 4)?;
/// assert_eq!(kv.get_int("scanCount"), 4);
/// ```
pub trait KeyValueStore: Send + Sync {
    /// Read the raw bytes stored under `key`
    ///
    /// # Errors
    ///
    /// Returns [`KvError`] if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Overwrite the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns [`KvError`] if the backing medium cannot be written.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove the value stored under `key` (no-op if absent)
    ///
    /// # Errors
    ///
    /// Returns [`KvError`] if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<()>;

    /// Read an integer, defaulting to 0
    fn get_int(&self, key: &str) -> i64 {
        read_text(self, key)
            .and_then(|text| text.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Store an integer
    ///
    /// # Errors
    ///
    /// Returns [`KvError`] if the backing medium cannot be written.
    fn set_int(&self, key: &str, value: i64) -> Result<()> {
        self.set(key, value.to_string().as_bytes())
    }

    /// Read a boolean, defaulting to `false`
    fn get_bool(&self, key: &str) -> bool {
        read_text(self, key).is_some_and(|text| text.trim() == "true")
    }

    /// Store a boolean
    ///
    /// # Errors
    ///
    /// Returns [`KvError`] if the backing medium cannot be written.
    fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set(key, if value { b"true" } else { b"false" })
    }
}

fn read_text<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(Some(bytes)) => String::from_utf8(bytes).ok(),
        Ok(None) => None,
        Err(error) => {
            tracing::warn!(key, error = %error, "Failed to read value, using default");
            None
        },
    }
}

/// Load a JSON value stored under `key`.
///
/// Missing keys, unreadable storage and undecodable payloads all yield
/// `None`; callers fall back to their empty/default state.
pub fn load_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let bytes = match store.get(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(error) => {
            tracing::warn!(key, error = %error, "Failed to read persisted value");
            return None;
        },
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(key, error = %error, "Discarding undecodable persisted value");
            None
        },
    }
}

/// Serialize `value` as JSON and overwrite `key` with it.
///
/// # Errors
///
/// Returns [`KvError::Serialization`] if the value cannot be encoded, or the
/// store's error if the write fails.
pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let bytes =
        serde_json::to_vec(value).map_err(|error| KvError::Serialization(error.to_string()))?;
    store.set(key, &bytes)
}

/// Write a whole collection, logging (not propagating) failures.
///
/// Persistence failures never interrupt a reducer: the in-memory state stays
/// authoritative and the next mutation writes the collection again.
pub fn persist<T, S>(store: &S, key: &str, value: &T)
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    if let Err(error) = save_json(store, key, value) {
        tracing::warn!(key, error = %error, "Failed to persist collection");
    } else {
        tracing::trace!(key, "Collection persisted");
    }
}
