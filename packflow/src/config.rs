//! Application configuration.
//!
//! Values have working defaults; the binary only overrides the data file
//! location through the environment.

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the data file used by the binary
pub const DATA_PATH_VAR: &str = "PACKFLOW_DATA";

/// Data file used when [`DATA_PATH_VAR`] is unset
pub const DEFAULT_DATA_FILE: &str = "packflow-data.json";

/// Behavior knobs for the PackFlow reducers.
#[derive(Debug, Clone)]
pub struct PackFlowConfig {
    /// How long a newly unlocked achievement stays in the
    /// "recently unlocked" list before it is dismissed.
    ///
    /// Default: 3 seconds
    pub recently_unlocked_window: Duration,

    /// Whether empty catalogs and template lists are seeded with the
    /// built-in defaults on load.
    ///
    /// Default: `true`
    pub seed_defaults: bool,
}

impl PackFlowConfig {
    /// Set the "recently unlocked" display window.
    #[must_use]
    pub const fn with_recently_unlocked_window(mut self, window: Duration) -> Self {
        self.recently_unlocked_window = window;
        self
    }

    /// Enable or disable default seeding.
    #[must_use]
    pub const fn with_seed_defaults(mut self, seed: bool) -> Self {
        self.seed_defaults = seed;
        self
    }
}

impl Default for PackFlowConfig {
    fn default() -> Self {
        Self {
            recently_unlocked_window: Duration::from_secs(3),
            seed_defaults: true,
        }
    }
}

/// Data file location: `$PACKFLOW_DATA`, else [`DEFAULT_DATA_FILE`] in the
/// working directory.
#[must_use]
pub fn data_path_from_env() -> PathBuf {
    std::env::var_os(DATA_PATH_VAR)
        .filter(|value| !value.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_DATA_FILE), PathBuf::from)
}
