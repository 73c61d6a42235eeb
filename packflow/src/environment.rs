//! Injected dependencies for the PackFlow reducers.

use crate::config::PackFlowConfig;
use crate::scanner::{NoCamera, ScannerDevice};
use packflow_core::environment::Clock;
use packflow_core::kv::KeyValueStore;
use std::sync::Arc;

/// Everything the reducers reach outside their own state
///
/// Constructed once per process and handed to the Store; there are no
/// ambient singletons.
#[derive(Clone)]
pub struct PackFlowEnvironment {
    /// Source of timestamps and the local calendar day
    pub clock: Arc<dyn Clock>,
    /// Durable storage for every collection
    pub kv: Arc<dyn KeyValueStore>,
    /// Barcode capture device
    pub scanner: Arc<dyn ScannerDevice>,
    /// Behavior knobs
    pub config: PackFlowConfig,
}

impl PackFlowEnvironment {
    /// Creates an environment without a camera and with default config
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            clock,
            kv,
            scanner: Arc::new(NoCamera),
            config: PackFlowConfig::default(),
        }
    }

    /// Use the given scanner device
    #[must_use]
    pub fn with_scanner(mut self, scanner: Arc<dyn ScannerDevice>) -> Self {
        self.scanner = scanner;
        self
    }

    /// Use the given configuration
    #[must_use]
    pub fn with_config(mut self, config: PackFlowConfig) -> Self {
        self.config = config;
        self
    }
}

impl std::fmt::Debug for PackFlowEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackFlowEnvironment")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
