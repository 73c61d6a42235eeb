//! App coordinator.
//!
//! Routes each action to its feature reducer and lifts the resulting effects
//! into [`AppAction`]. After any change to a count that an achievement
//! depends on, the coordinator feeds the new value to the tracker as a
//! [`Trigger`].

use crate::achievements::{AchievementAction, AchievementReducer, AchievementState, Trigger};
use crate::builder::{BuilderAction, BuilderReducer, BuilderState};
use crate::catalog::{CatalogAction, CatalogReducer, CatalogState};
use crate::environment::PackFlowEnvironment;
use crate::home::{HomeAction, HomeReducer, HomeState};
use crate::scanner::{ScannerAction, ScannerReducer, ScannerState};
use crate::storage::keys;
use packflow_core::{SmallVec, effect::Effect, reducer::Reducer};

type Effects = SmallVec<[Effect<AppAction>; 4]>;

/// Whole-application state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    /// Gear catalog
    pub catalog: CatalogState,
    /// Active flows and templates
    pub home: HomeState,
    /// Flow builder session
    pub builder: BuilderState,
    /// Achievements and streak
    pub achievements: AchievementState,
    /// Scanning session
    pub scanner: ScannerState,
    /// Whether onboarding has been completed
    pub has_completed_onboarding: bool,
}

/// Every action the application handles
#[derive(Clone, Debug, PartialEq)]
pub enum AppAction {
    /// Load all features, record today's activity and evaluate achievements
    Launch,
    /// Remember that onboarding is done
    CompleteOnboarding,
    /// Gear catalog action
    Catalog(CatalogAction),
    /// Flow action
    Home(HomeAction),
    /// Flow builder action
    Builder(BuilderAction),
    /// Scanner action
    Scanner(ScannerAction),
    /// Achievement action
    Achievements(AchievementAction),
}

/// Reducer for the whole application
#[derive(Clone, Debug, Default)]
pub struct AppReducer {
    catalog: CatalogReducer,
    home: HomeReducer,
    builder: BuilderReducer,
    achievements: AchievementReducer,
    scanner: ScannerReducer,
}

/// Lift a feature's effects into [`AppAction`]
fn lift<A>(effects: SmallVec<[Effect<A>; 4]>, wrap: fn(A) -> AppAction) -> Effects
where
    A: Send + 'static,
{
    effects.into_iter().map(|effect| effect.map(wrap)).collect()
}

impl AppReducer {
    /// Creates a new `AppReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            catalog: CatalogReducer::new(),
            home: HomeReducer::new(),
            builder: BuilderReducer::new(),
            achievements: AchievementReducer::new(),
            scanner: ScannerReducer::new(),
        }
    }

    fn catalog(
        &self,
        state: &mut AppState,
        action: CatalogAction,
        env: &PackFlowEnvironment,
    ) -> Effects {
        lift(
            self.catalog.reduce(&mut state.catalog, action, env),
            AppAction::Catalog,
        )
    }

    fn home(&self, state: &mut AppState, action: HomeAction, env: &PackFlowEnvironment) -> Effects {
        lift(self.home.reduce(&mut state.home, action, env), AppAction::Home)
    }

    fn achievements(
        &self,
        state: &mut AppState,
        action: AchievementAction,
        env: &PackFlowEnvironment,
    ) -> Effects {
        lift(
            self.achievements.reduce(&mut state.achievements, action, env),
            AppAction::Achievements,
        )
    }

    fn evaluate(
        &self,
        state: &mut AppState,
        trigger: Trigger,
        env: &PackFlowEnvironment,
    ) -> Effects {
        self.achievements(state, AchievementAction::Evaluate { trigger }, env)
    }

    fn launch(&self, state: &mut AppState, env: &PackFlowEnvironment) -> Effects {
        tracing::info!("Launching");
        let mut effects = self.catalog(state, CatalogAction::Load, env);
        effects.extend(self.home(state, HomeAction::Load, env));
        effects.extend(self.achievements(state, AchievementAction::Load, env));
        effects.extend(lift(
            self.scanner.reduce(&mut state.scanner, ScannerAction::Load, env),
            AppAction::Scanner,
        ));
        state.has_completed_onboarding = env.kv.get_bool(keys::HAS_COMPLETED_ONBOARDING);

        effects.extend(self.achievements(state, AchievementAction::RecordDailyActivity, env));
        let flows = state.home.active_flow_count();
        let items = state.catalog.count();
        let custom = state.home.custom_flows_count();
        effects.extend(self.evaluate(state, Trigger::FlowCount(flows), env));
        effects.extend(self.evaluate(state, Trigger::CatalogCount(items), env));
        effects.extend(self.evaluate(state, Trigger::CustomFlowCount(custom), env));
        effects
    }

    fn on_catalog(
        &self,
        state: &mut AppState,
        action: CatalogAction,
        env: &PackFlowEnvironment,
    ) -> Effects {
        let mut effects = self.catalog(state, action, env);
        let items = state.catalog.count();
        effects.extend(self.evaluate(state, Trigger::CatalogCount(items), env));
        effects
    }

    fn on_home(
        &self,
        state: &mut AppState,
        action: HomeAction,
        env: &PackFlowEnvironment,
    ) -> Effects {
        match action {
            HomeAction::AddActiveFlow { flow } => {
                let progress = flow.progress();
                let is_custom = flow.is_custom;
                let mut effects = self.home(state, HomeAction::AddActiveFlow { flow }, env);

                let flows = state.home.active_flow_count();
                effects.extend(self.evaluate(state, Trigger::FlowCount(flows), env));
                effects.extend(self.evaluate(state, Trigger::FlowProgress(progress), env));
                if is_custom {
                    let custom = state.home.custom_flows_count();
                    effects.extend(self.evaluate(state, Trigger::CustomFlowCount(custom), env));
                }
                effects
            },
            HomeAction::ToggleFlowItem { flow_id, item_id } => {
                let mut effects =
                    self.home(state, HomeAction::ToggleFlowItem { flow_id, item_id }, env);
                if let Some(progress) = state.home.flow(flow_id).map(|flow| flow.progress()) {
                    effects.extend(self.evaluate(state, Trigger::FlowProgress(progress), env));
                }
                effects
            },
            action => self.home(state, action, env),
        }
    }

    fn on_builder(
        &self,
        state: &mut AppState,
        action: BuilderAction,
        env: &PackFlowEnvironment,
    ) -> Effects {
        if action != BuilderAction::Commit {
            return lift(
                self.builder.reduce(&mut state.builder, action, env),
                AppAction::Builder,
            );
        }

        match state.builder.take_committable() {
            Some(flow) => {
                tracing::debug!(id = %flow.id, "Committing staged flow");
                self.on_home(state, HomeAction::AddActiveFlow { flow }, env)
            },
            None => {
                tracing::debug!("Commit ignored: no items staged");
                SmallVec::new()
            },
        }
    }

    fn on_scanner(
        &self,
        state: &mut AppState,
        action: ScannerAction,
        env: &PackFlowEnvironment,
    ) -> Effects {
        let confirmed = match action {
            ScannerAction::Confirm => state.scanner.found_product.clone(),
            _ => None,
        };

        let mut effects = lift(
            self.scanner.reduce(&mut state.scanner, action, env),
            AppAction::Scanner,
        );

        if let Some(item) = confirmed {
            effects.extend(self.on_catalog(state, CatalogAction::Add { item }, env));
            let scans = state.scanner.scan_count;
            effects.extend(self.evaluate(state, Trigger::ScanCount(scans), env));
        }
        effects
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = PackFlowEnvironment;

    #[tracing::instrument(skip_all, name = "app_reduce")]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AppAction::Launch => self.launch(state, env),
            AppAction::CompleteOnboarding => {
                state.has_completed_onboarding = true;
                if let Err(error) = env.kv.set_bool(keys::HAS_COMPLETED_ONBOARDING, true) {
                    tracing::warn!(%error, "Failed to persist onboarding flag");
                }
                SmallVec::new()
            },
            AppAction::Catalog(action) => self.on_catalog(state, action, env),
            AppAction::Home(action) => self.on_home(state, action, env),
            AppAction::Builder(action) => self.on_builder(state, action, env),
            AppAction::Scanner(action) => self.on_scanner(state, action, env),
            AppAction::Achievements(action) => self.achievements(state, action, env),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AchievementType, FlowItem, GearCategory, GearItem, PackingFlow};
    use packflow_core::environment::Clock;
    use packflow_core::kv::KeyValueStore;
    use packflow_testing::{InMemoryKeyValueStore, ReducerTest, assertions, test_clock};
    use std::sync::Arc;

    fn env_with(kv: &InMemoryKeyValueStore) -> PackFlowEnvironment {
        PackFlowEnvironment::new(Arc::new(test_clock()), Arc::new(kv.clone()))
    }

    fn launched(env: &PackFlowEnvironment) -> AppState {
        let mut state = AppState::default();
        let _ = AppReducer::new().reduce(&mut state, AppAction::Launch, env);
        state
    }

    #[test]
    fn launch_seeds_and_records_activity() {
        let kv = InMemoryKeyValueStore::new();
        let observer = kv.clone();

        ReducerTest::new(AppReducer::new())
            .with_env(env_with(&kv))
            .given_state(AppState::default())
            .when_action(AppAction::Launch)
            .then_state(move |state| {
                assert_eq!(state.catalog.count(), 7);
                assert_eq!(state.home.templates.len(), 3);
                assert_eq!(state.achievements.total_count(), 7);
                assert_eq!(state.achievements.unlocked_count(), 0);
                assert_eq!(state.achievements.consecutive_days, 1);
                assert!(!state.has_completed_onboarding);
                assert_eq!(
                    observer.keys(),
                    vec![
                        "achievements",
                        "consecutiveDays",
                        "gearItems",
                        "lastActiveDate",
                        "templates",
                    ]
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn complete_onboarding_persists_flag() {
        let kv = InMemoryKeyValueStore::new();
        let env = env_with(&kv);
        let mut state = launched(&env);

        let _ = AppReducer::new().reduce(&mut state, AppAction::CompleteOnboarding, &env);

        assert!(state.has_completed_onboarding);
        assert!(launched(&env).has_completed_onboarding);
    }

    #[test]
    fn twentieth_catalog_item_unlocks_catalog_master() {
        let kv = InMemoryKeyValueStore::new();
        let env = env_with(&kv);
        let reducer = AppReducer::new();
        let mut state = launched(&env);

        for n in state.catalog.count()..19 {
            let item = GearItem::new(format!("Item {n}"), GearCategory::Other);
            let effects =
                reducer.reduce(&mut state, AppAction::Catalog(CatalogAction::Add { item }), &env);
            assert!(effects.is_empty());
        }
        assert_eq!(state.catalog.count(), 19);
        assert!(!state.achievements.is_unlocked(AchievementType::CatalogMaster));

        let item = GearItem::new("Item 20", GearCategory::Other);
        let effects =
            reducer.reduce(&mut state, AppAction::Catalog(CatalogAction::Add { item }), &env);
        assert_eq!(effects.len(), 1);
        assert!(state.achievements.is_unlocked(AchievementType::CatalogMaster));

        let item = GearItem::new("Item 21", GearCategory::Other);
        let effects =
            reducer.reduce(&mut state, AppAction::Catalog(CatalogAction::Add { item }), &env);
        assert!(effects.is_empty());
        assert_eq!(state.achievements.recently_unlocked.len(), 1);
    }

    #[test]
    fn commit_saves_flow_and_unlocks_first_flow() {
        let kv = InMemoryKeyValueStore::new();
        let env = env_with(&kv);
        let reducer = AppReducer::new();
        let mut state = launched(&env);
        let template = state.home.templates[0].clone();

        let _ = reducer.reduce(
            &mut state,
            AppAction::Builder(BuilderAction::SelectTemplate { template }),
            &env,
        );
        let effects = reducer.reduce(&mut state, AppAction::Builder(BuilderAction::Commit), &env);

        assert_eq!(state.home.active_flow_count(), 1);
        assert_eq!(state.builder, BuilderState::default());
        assert!(state.achievements.is_unlocked(AchievementType::FirstFlow));
        assert!(!state.achievements.is_unlocked(AchievementType::PerfectPack));
        assert_eq!(assertions::cancellable_ids(&effects).len(), 1);
    }

    #[test]
    fn commit_of_empty_flow_is_rejected() {
        let kv = InMemoryKeyValueStore::new();
        let env = env_with(&kv);
        let reducer = AppReducer::new();
        let mut state = launched(&env);

        let _ = reducer.reduce(
            &mut state,
            AppAction::Builder(BuilderAction::CreateCustomFlow {
                title: "Empty".to_string(),
            }),
            &env,
        );
        let effects = reducer.reduce(&mut state, AppAction::Builder(BuilderAction::Commit), &env);

        assert!(effects.is_empty());
        assert_eq!(state.home.active_flow_count(), 0);
        assert!(state.builder.current_flow.is_some());
    }

    #[test]
    fn checking_last_item_unlocks_perfect_pack() {
        let kv = InMemoryKeyValueStore::new();
        let env = env_with(&kv);
        let reducer = AppReducer::new();
        let mut state = launched(&env);

        let mut flow = PackingFlow::new("Run", test_clock().now());
        flow.items = vec![
            FlowItem {
                is_checked: true,
                ..FlowItem::new("Shoes", GearCategory::Footwear)
            },
            FlowItem::new("Shorts", GearCategory::Clothing),
        ];
        let flow_id = flow.id;
        let item_id = flow.items[1].id;
        let _ = reducer.reduce(
            &mut state,
            AppAction::Home(HomeAction::AddActiveFlow { flow }),
            &env,
        );
        assert!((state.home.flow(flow_id).unwrap().progress() - 0.5).abs() < f64::EPSILON);
        assert!(!state.achievements.is_unlocked(AchievementType::PerfectPack));

        let _ = reducer.reduce(
            &mut state,
            AppAction::Home(HomeAction::ToggleFlowItem { flow_id, item_id }),
            &env,
        );

        assert!((state.home.flow(flow_id).unwrap().progress() - 1.0).abs() < f64::EPSILON);
        assert!(state.achievements.is_unlocked(AchievementType::PerfectPack));
    }

    #[test]
    fn fifth_custom_flow_unlocks_custom_creator() {
        let kv = InMemoryKeyValueStore::new();
        let env = env_with(&kv);
        let reducer = AppReducer::new();
        let mut state = launched(&env);

        for n in 1..=5 {
            let _ = reducer.reduce(
                &mut state,
                AppAction::Builder(BuilderAction::CreateCustomFlow {
                    title: format!("Custom {n}"),
                }),
                &env,
            );
            let _ = reducer.reduce(
                &mut state,
                AppAction::Builder(BuilderAction::AddCustomItem {
                    name: "Chalk".to_string(),
                    category: GearCategory::Equipment,
                }),
                &env,
            );
            let _ = reducer.reduce(&mut state, AppAction::Builder(BuilderAction::Commit), &env);
            assert_eq!(
                state.achievements.is_unlocked(AchievementType::CustomFlowCreator),
                n == 5
            );
        }
        assert_eq!(state.home.custom_flows_count(), 5);
    }

    #[test]
    fn confirmed_scans_fill_catalog_and_unlock_scanner_pro() {
        let kv = InMemoryKeyValueStore::new();
        let env = env_with(&kv);
        let reducer = AppReducer::new();
        let mut state = launched(&env);
        state.scanner.camera_available = true;

        for n in 1..=5 {
            let _ = reducer.reduce(&mut state, AppAction::Scanner(ScannerAction::Start), &env);
            let _ = reducer.reduce(
                &mut state,
                AppAction::Scanner(ScannerAction::CodeDecoded {
                    code: format!("00{n}"),
                }),
                &env,
            );
            let _ = reducer.reduce(&mut state, AppAction::Scanner(ScannerAction::Confirm), &env);
            let _ = reducer.reduce(&mut state, AppAction::Scanner(ScannerAction::Stop), &env);
            assert_eq!(
                state.achievements.is_unlocked(AchievementType::ScannerPro),
                n == 5
            );
        }

        assert_eq!(state.scanner.scan_count, 5);
        assert_eq!(kv.get_int(keys::SCAN_COUNT), 5);
        assert_eq!(state.catalog.count(), 12);
        assert!(state
            .catalog
            .items
            .iter()
            .any(|item| item.name == "Product 005" && item.category == GearCategory::Other));
    }

    #[test]
    fn cancelled_scan_adds_nothing() {
        let kv = InMemoryKeyValueStore::new();
        let env = env_with(&kv);
        let reducer = AppReducer::new();
        let mut state = launched(&env);
        state.scanner.camera_available = true;
        state.scanner.is_scanning = true;

        let _ = reducer.reduce(
            &mut state,
            AppAction::Scanner(ScannerAction::CodeDecoded {
                code: "999".to_string(),
            }),
            &env,
        );
        let _ = reducer.reduce(&mut state, AppAction::Scanner(ScannerAction::Cancel), &env);

        assert_eq!(state.catalog.count(), 7);
        assert_eq!(state.scanner.scan_count, 0);
    }
}
