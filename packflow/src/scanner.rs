//! Barcode scanning session.
//!
//! The camera itself sits behind [`ScannerDevice`]. Device calls run as
//! effects so a slow capture session never blocks the reducer; decoded
//! codes come back in as [`ScannerAction::CodeDecoded`].

use crate::environment::PackFlowEnvironment;
use crate::storage::keys;
use crate::types::{GearCategory, GearItem};
use packflow_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};

/// Camera and barcode decoder
pub trait ScannerDevice: Send + Sync {
    /// Prepare the capture session; `false` when no camera is usable
    fn setup(&self) -> bool;

    /// Begin delivering decoded codes
    fn start_scanning(&self);

    /// Stop the capture session
    fn stop_scanning(&self);
}

/// Device for hosts without a camera
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCamera;

impl ScannerDevice for NoCamera {
    fn setup(&self) -> bool {
        false
    }

    fn start_scanning(&self) {}

    fn stop_scanning(&self) {}
}

/// State of the scanning session
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScannerState {
    /// Result of the last setup
    pub camera_available: bool,
    /// Whether codes are being accepted
    pub is_scanning: bool,
    /// Last decoded code
    pub scanned_code: Option<String>,
    /// Product awaiting confirm or cancel
    pub found_product: Option<GearItem>,
    /// Confirmed scans, persisted under [`keys::SCAN_COUNT`]
    pub scan_count: i64,
}

/// Actions for the scanning session
#[derive(Clone, Debug, PartialEq)]
pub enum ScannerAction {
    /// Read the persisted scan count
    Load,
    /// Ask the device to prepare a capture session
    Setup,
    /// Device answered a setup request
    SetupCompleted {
        /// Whether a camera is usable
        available: bool,
    },
    /// Start accepting codes
    Start,
    /// Stop accepting codes
    Stop,
    /// The device decoded a code
    CodeDecoded {
        /// Decoded barcode text
        code: String,
    },
    /// Discard the found product and scan again
    Cancel,
    /// Accept the found product (the app adds it to the catalog)
    Confirm,
}

/// Placeholder product for a scanned code; there is no product lookup.
#[must_use]
pub fn product_for_code(code: &str, env: &PackFlowEnvironment) -> GearItem {
    GearItem::new(format!("Product {code}"), GearCategory::Other).last_used(env.clock.now())
}

/// Reducer for the scanning session
#[derive(Clone, Debug, Default)]
pub struct ScannerReducer;

impl ScannerReducer {
    /// Creates a new `ScannerReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn start(state: &mut ScannerState, env: &PackFlowEnvironment) -> Effect<ScannerAction> {
        if !state.camera_available || state.is_scanning {
            return Effect::None;
        }
        state.is_scanning = true;

        let device = env.scanner.clone();
        async_effect! {
            device.start_scanning();
            None
        }
    }

    fn stop(state: &mut ScannerState, env: &PackFlowEnvironment) -> Effect<ScannerAction> {
        state.is_scanning = false;

        let device = env.scanner.clone();
        async_effect! {
            device.stop_scanning();
            None
        }
    }
}

impl Reducer for ScannerReducer {
    type State = ScannerState;
    type Action = ScannerAction;
    type Environment = PackFlowEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ScannerAction::Load => {
                state.scan_count = env.kv.get_int(keys::SCAN_COUNT);
                SmallVec::new()
            },
            ScannerAction::Setup => {
                let device = env.scanner.clone();
                smallvec![async_effect! {
                    Some(ScannerAction::SetupCompleted { available: device.setup() })
                }]
            },
            ScannerAction::SetupCompleted { available } => {
                if !available {
                    tracing::warn!("No camera available for scanning");
                }
                state.camera_available = available;
                SmallVec::new()
            },
            ScannerAction::Start => smallvec![Self::start(state, env)],
            ScannerAction::Stop => smallvec![Self::stop(state, env)],
            ScannerAction::CodeDecoded { code } => {
                if !state.is_scanning {
                    tracing::debug!(%code, "Ignoring code decoded outside a session");
                    return SmallVec::new();
                }
                tracing::debug!(%code, "Barcode decoded");
                state.found_product = Some(product_for_code(&code, env));
                state.scanned_code = Some(code);
                smallvec![Self::stop(state, env)]
            },
            ScannerAction::Cancel => {
                state.found_product = None;
                state.scanned_code = None;
                smallvec![Self::start(state, env)]
            },
            ScannerAction::Confirm => {
                if state.found_product.take().is_none() {
                    return SmallVec::new();
                }
                state.scanned_code = None;
                state.scan_count += 1;
                if let Err(error) = env.kv.set_int(keys::SCAN_COUNT, state.scan_count) {
                    tracing::warn!(%error, "Failed to persist scan count");
                }
                smallvec![Self::start(state, env)]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockScanner;
    use packflow_core::kv::KeyValueStore;
    use packflow_testing::{InMemoryKeyValueStore, ReducerTest, assertions, test_clock};
    use std::sync::Arc;

    fn env_with(kv: &InMemoryKeyValueStore) -> PackFlowEnvironment {
        PackFlowEnvironment::new(Arc::new(test_clock()), Arc::new(kv.clone()))
            .with_scanner(Arc::new(MockScanner::with_camera()))
    }

    fn scanning() -> ScannerState {
        ScannerState {
            camera_available: true,
            is_scanning: true,
            ..ScannerState::default()
        }
    }

    #[test]
    fn setup_asks_the_device() {
        ReducerTest::new(ScannerReducer::new())
            .with_env(env_with(&InMemoryKeyValueStore::new()))
            .given_state(ScannerState::default())
            .when_action(ScannerAction::Setup)
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn unavailable_camera_blocks_start() {
        ReducerTest::new(ScannerReducer::new())
            .with_env(env_with(&InMemoryKeyValueStore::new()))
            .given_state(ScannerState::default())
            .when_action(ScannerAction::Start)
            .then_state(|state| assert!(!state.is_scanning))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn first_code_stops_the_session() {
        ReducerTest::new(ScannerReducer::new())
            .with_env(env_with(&InMemoryKeyValueStore::new()))
            .given_state(scanning())
            .when_action(ScannerAction::CodeDecoded {
                code: "4006381333931".to_string(),
            })
            .then_state(|state| {
                assert!(!state.is_scanning);
                assert_eq!(state.scanned_code.as_deref(), Some("4006381333931"));
                let product = state.found_product.as_ref().unwrap();
                assert_eq!(product.name, "Product 4006381333931");
                assert_eq!(product.category, GearCategory::Other);
                assert!(product.last_used_at.is_some());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn codes_outside_a_session_are_ignored() {
        ReducerTest::new(ScannerReducer::new())
            .with_env(env_with(&InMemoryKeyValueStore::new()))
            .given_state(ScannerState {
                camera_available: true,
                ..ScannerState::default()
            })
            .when_action(ScannerAction::CodeDecoded {
                code: "123".to_string(),
            })
            .then_state(|state| assert!(state.found_product.is_none()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn confirm_counts_scan_and_restarts() {
        let kv = InMemoryKeyValueStore::new();
        let observer = kv.clone();
        let env = env_with(&kv);
        let state = ScannerState {
            camera_available: true,
            scan_count: 2,
            found_product: Some(product_for_code("42", &env)),
            scanned_code: Some("42".to_string()),
            ..ScannerState::default()
        };

        ReducerTest::new(ScannerReducer::new())
            .with_env(env)
            .given_state(state)
            .when_action(ScannerAction::Confirm)
            .then_state(move |state| {
                assert!(state.found_product.is_none());
                assert!(state.scanned_code.is_none());
                assert!(state.is_scanning);
                assert_eq!(state.scan_count, 3);
                assert_eq!(observer.get_int(keys::SCAN_COUNT), 3);
            })
            .run();
    }

    #[test]
    fn confirm_without_product_is_a_no_op() {
        let kv = InMemoryKeyValueStore::new();

        ReducerTest::new(ScannerReducer::new())
            .with_env(env_with(&kv))
            .given_state(ScannerState::default())
            .when_action(ScannerAction::Confirm)
            .then_state(|state| assert_eq!(state.scan_count, 0))
            .then_effects(assertions::assert_no_effects)
            .run();

        assert!(!kv.contains_key(keys::SCAN_COUNT));
    }

    #[test]
    fn cancel_discards_product() {
        let env = env_with(&InMemoryKeyValueStore::new());
        let state = ScannerState {
            camera_available: true,
            found_product: Some(product_for_code("7", &env)),
            ..ScannerState::default()
        };

        ReducerTest::new(ScannerReducer::new())
            .with_env(env)
            .given_state(state)
            .when_action(ScannerAction::Cancel)
            .then_state(|state| {
                assert!(state.found_product.is_none());
                assert!(state.is_scanning);
            })
            .run();
    }
}
