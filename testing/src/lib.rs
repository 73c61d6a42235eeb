//! # PackFlow Testing
//!
//! Testing utilities and helpers for PackFlow reducers.
//!
//! This crate provides:
//! - Mock implementations of Environment traits (clocks, key-value stores)
//! - The [`ReducerTest`] Given-When-Then harness
//! - Assertion helpers for reducers and stores
//!
//! ## Example
//!
//! ```ignore
//! use packflow_testing::{InMemoryKeyValueStore, test_clock};
//! use packflow_runtime::Store;
//!
//! #[tokio::test]
//! async fn adding_gear_is_persisted() {
//!     let kv = Arc::new(InMemoryKeyValueStore::new());
//!     let env = PackFlowEnvironment::new(Arc::new(test_clock()), kv.clone());
//!     let store = Store::new(AppState::default(), AppReducer::new(), env);
//!
//!     store.send(AppAction::Launch).await?;
//!     assert!(kv.contains_key("gearItems"));
//! }
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use packflow_core::environment::Clock;


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, NaiveDate, Utc};
    use packflow_core::kv::{KeyValueStore, KvError, Result};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex, RwLock};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible. The calendar
    /// day is the UTC date of that instant, independent of the host time zone.
    ///
    /// # Example
    ///
    /// ```
    /// use packflow_testing::mocks::FixedClock;
    /// use packflow_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }

        fn today(&self) -> NaiveDate {
            self.time.date_naive()
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Clock that tests move forward explicitly
    ///
    /// Clones share the same instant, so a test can keep one handle while the
    /// environment holds another.
    ///
    /// ```
    /// use packflow_testing::mocks::ManualClock;
    /// use packflow_core::environment::Clock;
    ///
    /// let clock = ManualClock::starting_at_test_epoch();
    /// let day = clock.today();
    /// clock.advance_days(1);
    /// assert_eq!(clock.today(), day.succ_opt().unwrap());
    /// ```
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        /// Create a clock frozen at `time`
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Create a clock frozen at the same instant as [`test_clock`]
        #[must_use]
        pub fn starting_at_test_epoch() -> Self {
            Self::new(test_clock().now())
        }

        /// Jump to `time`
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        pub fn set(&self, time: DateTime<Utc>) {
            *self.time.lock().unwrap() = time;
        }

        /// Move forward by `delta`
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        pub fn advance(&self, delta: chrono::Duration) {
            let mut time = self.time.lock().unwrap();
            *time += delta;
        }

        /// Move forward by whole calendar days
        pub fn advance_days(&self, days: i64) {
            self.advance(chrono::Duration::days(days));
        }
    }

    impl Clock for ManualClock {
        #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap()
        }

        fn today(&self) -> NaiveDate {
            self.now().date_naive()
        }
    }

    /// In-memory key-value store for testing
    ///
    /// Stores values in a `HashMap` behind a `RwLock`. Clones share storage,
    /// so a test can inspect what a reducer wrote through its environment.
    ///
    /// # Example
    ///
    /// ```
    /// use packflow_testing::mocks::InMemoryKeyValueStore;
    /// use packflow_core::kv::KeyValueStore;
    ///
    /// let kv = InMemoryKeyValueStore::new();
    /// kv.set_int("scanCount", 3).unwrap();
    /// assert_eq!(kv.get_int("scanCount"), 3);
    /// assert!(kv.contains_key("scanCount"));
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct InMemoryKeyValueStore {
        values: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    }

    impl InMemoryKeyValueStore {
        /// Create an empty store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of keys currently stored
        #[must_use]
        #[allow(clippy::unwrap_used)] // Lock poison is unrecoverable
        pub fn len(&self) -> usize {
            self.values.read().unwrap().len()
        }

        /// Whether no keys are stored
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        /// Whether `key` has been written
        #[must_use]
        #[allow(clippy::unwrap_used)] // Lock poison is unrecoverable
        pub fn contains_key(&self, key: &str) -> bool {
            self.values.read().unwrap().contains_key(key)
        }

        /// All stored keys, sorted
        #[must_use]
        #[allow(clippy::unwrap_used)] // Lock poison is unrecoverable
        pub fn keys(&self) -> Vec<String> {
            let mut keys: Vec<String> = self.values.read().unwrap().keys().cloned().collect();
            keys.sort();
            keys
        }

        /// The value under `key` as UTF-8 text
        #[must_use]
        #[allow(clippy::unwrap_used)] // Lock poison is unrecoverable
        pub fn raw(&self, key: &str) -> Option<String> {
            self.values
                .read()
                .unwrap()
                .get(key)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        }

        /// Drop every stored value
        #[allow(clippy::unwrap_used)] // Lock poison is unrecoverable
        pub fn clear(&self) {
            self.values.write().unwrap().clear();
        }
    }

    impl KeyValueStore for InMemoryKeyValueStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            let values = self
                .values
                .read()
                .map_err(|_| KvError::Unavailable("lock poisoned".to_string()))?;
            Ok(values.get(key).cloned())
        }

        fn set(&self, key: &str, value: &[u8]) -> Result<()> {
            let mut values = self
                .values
                .write()
                .map_err(|_| KvError::Unavailable("lock poisoned".to_string()))?;
            values.insert(key.to_string(), value.to_vec());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            let mut values = self
                .values
                .write()
                .map_err(|_| KvError::Unavailable("lock poisoned".to_string()))?;
            values.remove(key);
            Ok(())
        }
    }

    /// Key-value store whose every operation fails
    ///
    /// Used to check that persistence failures degrade to defaults instead
    /// of interrupting a reducer.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct FailingKeyValueStore;

    impl KeyValueStore for FailingKeyValueStore {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Err(KvError::Io("disk unavailable".to_string()))
        }

        fn set(&self, _key: &str, _value: &[u8]) -> Result<()> {
            Err(KvError::Io("disk unavailable".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(KvError::Io("disk unavailable".to_string()))
        }
    }
}

/// Install a test-friendly tracing subscriber
///
/// Honors `RUST_LOG`; output is captured by the test harness. Safe to call
/// from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FailingKeyValueStore, FixedClock, InMemoryKeyValueStore, ManualClock, test_clock};
