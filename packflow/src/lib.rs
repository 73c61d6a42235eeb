//! PackFlow: packing checklists for sporting activities.
//!
//! The application keeps a catalog of personal gear, builds packing flows
//! (checklists) from templates or from scratch, tracks packing progress and
//! awards achievements for milestones. Every feature is a reducer; the
//! [`AppReducer`] composes them and feeds count changes to the achievement
//! tracker.
//!
//! # Quick Start
//!
//! ```no_run
//! use packflow::{AppAction, AppReducer, AppState, PackFlowEnvironment};
//! use packflow::storage::FileKeyValueStore;
//! use packflow_core::environment::SystemClock;
//! use packflow_runtime::Store;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let kv = FileKeyValueStore::open("packflow-data.json")?;
//! let env = PackFlowEnvironment::new(Arc::new(SystemClock), Arc::new(kv));
//! let store = Store::new(AppState::default(), AppReducer::new(), env);
//!
//! store.send(AppAction::Launch).await?;
//!
//! let gear = store.state(|s| s.catalog.count()).await;
//! println!("Gear items: {gear}");
//! # Ok(())
//! # }
//! ```

pub mod achievements;
pub mod app;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod environment;
pub mod home;
pub mod mocks;
pub mod scanner;
pub mod share;
pub mod storage;
pub mod types;

pub use achievements::{AchievementAction, AchievementReducer, AchievementState, Trigger};
pub use app::{AppAction, AppReducer, AppState};
pub use builder::{BuilderAction, BuilderReducer, BuilderState, BuilderStep};
pub use catalog::{CatalogAction, CatalogReducer, CatalogState, GearFilter};
pub use config::PackFlowConfig;
pub use environment::PackFlowEnvironment;
pub use home::{HomeAction, HomeReducer, HomeState};
pub use scanner::{NoCamera, ScannerAction, ScannerDevice, ScannerReducer, ScannerState};
pub use share::share_text;
pub use types::{
    Achievement, AchievementId, AchievementType, FlowId, FlowItem, FlowItemId, FlowTemplate,
    GearCategory, GearItem, GearItemId, PackingFlow, TemplateId,
};
