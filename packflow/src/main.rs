//! Command-line walkthrough of a PackFlow session.
//!
//! Opens (or creates) the data file named by `PACKFLOW_DATA`, launches the
//! app, builds a flow from the first template, packs it and prints the
//! catalog, the shareable checklist and the achievement board.

use packflow::config::data_path_from_env;
use packflow::storage::FileKeyValueStore;
use packflow::{
    AchievementAction, AppAction, AppReducer, AppState, BuilderAction, GearCategory, GearFilter,
    HomeAction, PackFlowEnvironment, share_text,
};
use packflow_core::environment::SystemClock;
use packflow_core::kv::KvError;
use packflow_runtime::{Store, StoreError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
enum DemoError {
    #[error("could not open data file: {0}")]
    Storage(#[from] KvError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Missing(&'static str),
}

type AppStore = Store<AppState, AppAction, PackFlowEnvironment, AppReducer>;

async fn dispatch(store: &AppStore, action: AppAction) -> Result<(), DemoError> {
    let mut handle = store.send(action).await?;
    handle.wait().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), DemoError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("packflow=info")),
        )
        .init();

    let path = data_path_from_env();
    let kv = FileKeyValueStore::open(&path)?;
    tracing::info!(path = %path.display(), "Using data file");

    let env = PackFlowEnvironment::new(Arc::new(SystemClock), Arc::new(kv));
    let store = Store::new(AppState::default(), AppReducer::new(), env);

    println!("=== PackFlow ===\n");
    dispatch(&store, AppAction::Launch).await?;

    if !store.state(|s| s.has_completed_onboarding).await {
        println!("Welcome! Completing onboarding...");
        dispatch(&store, AppAction::CompleteOnboarding).await?;
    }

    let template = store
        .state(|s| s.home.templates.first().cloned())
        .await
        .ok_or(DemoError::Missing("no templates available"))?;
    println!("Building a flow from '{}'...", template.name);

    for action in [
        BuilderAction::SelectTemplate { template },
        BuilderAction::ProceedToPersonalization,
        BuilderAction::AddCustomItem {
            name: "Energy Gel".to_string(),
            category: GearCategory::Nutrition,
        },
        BuilderAction::Commit,
    ] {
        dispatch(&store, AppAction::Builder(action)).await?;
    }

    let flow = store
        .state(|s| s.home.active_flows.last().cloned())
        .await
        .ok_or(DemoError::Missing("flow was not saved"))?;

    println!("Packing {} items...", flow.items.len());
    for item in &flow.items {
        dispatch(
            &store,
            AppAction::Home(HomeAction::ToggleFlowItem {
                flow_id: flow.id,
                item_id: item.id,
            }),
        )
        .await?;
    }

    let state = store.state(Clone::clone).await;

    println!("\nGear catalog ({} items):", state.catalog.count());
    for item in state.catalog.list(&GearFilter::default()) {
        let packed = if item.is_packed { "✓" } else { " " };
        println!("  [{packed}] {} {} ({})", item.category.icon(), item.name, item.category);
    }

    if let Some(packed) = state.home.flow(flow.id) {
        println!("\n{}", share_text(packed));
    }

    println!(
        "\nAchievements: {}/{} unlocked, {}-day streak",
        state.achievements.unlocked_count(),
        state.achievements.total_count(),
        state.achievements.consecutive_days
    );
    for achievement in &state.achievements.achievements {
        let mark = if achievement.is_unlocked { "★" } else { "·" };
        println!(
            "  {mark} {} {}: {}",
            achievement.kind.icon(),
            achievement.kind.title(),
            achievement.kind.description()
        );
    }

    // Drop pending toast timers so shutdown does not wait them out.
    store
        .send(AppAction::Achievements(AchievementAction::ClearRecent))
        .await?;
    store.shutdown(Some(Duration::from_secs(5))).await?;

    println!("\n=== Session saved ===");
    Ok(())
}
