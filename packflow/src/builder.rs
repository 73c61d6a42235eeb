//! Flow builder session.
//!
//! Stages one new flow, from a template or from scratch, in two steps:
//! pick a starting point, then personalize the items. Nothing here is
//! persisted; committing hands the flow to the home feature (see
//! [`crate::app::AppReducer`]).

use crate::environment::PackFlowEnvironment;
use crate::home::create_flow;
use crate::types::{
    FlowItem, FlowItemId, FlowTemplate, GearCategory, GearItem, PackingFlow, TemplateId,
};
use packflow_core::{SmallVec, effect::Effect, reducer::Reducer};

/// Where the session is in the two-step builder
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BuilderStep {
    /// Choosing a template or starting a custom flow
    #[default]
    SelectTemplate,
    /// Checking, adding and removing items
    Personalize,
}

/// Transient builder state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuilderState {
    /// Current step
    pub step: BuilderStep,
    /// The flow being staged
    pub current_flow: Option<PackingFlow>,
    /// Template the staged flow came from
    pub selected_template: Option<TemplateId>,
}

impl BuilderState {
    /// Progress of the staged flow, 0.0 without one
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.current_flow.as_ref().map_or(0.0, PackingFlow::progress)
    }

    /// Whether personalization can be entered
    #[must_use]
    pub const fn can_proceed(&self) -> bool {
        self.current_flow.is_some()
    }

    /// Whether the staged flow can be saved
    #[must_use]
    pub fn can_commit(&self) -> bool {
        self.current_flow
            .as_ref()
            .is_some_and(|flow| !flow.items.is_empty())
    }

    /// Takes the staged flow and resets the session, if it can be committed
    pub fn take_committable(&mut self) -> Option<PackingFlow> {
        if !self.can_commit() {
            return None;
        }
        std::mem::take(self).current_flow
    }

    fn push_item(&mut self, item: FlowItem) {
        match self.current_flow.as_mut() {
            Some(flow) => flow.items.push(item),
            None => tracing::debug!("No flow staged; item ignored"),
        }
    }
}

/// Actions for the flow builder
#[derive(Clone, Debug, PartialEq)]
pub enum BuilderAction {
    /// Stage a copy of a template
    SelectTemplate {
        /// Template to copy
        template: FlowTemplate,
    },
    /// Stage an empty custom flow
    CreateCustomFlow {
        /// Title of the new flow
        title: String,
    },
    /// Append a freestanding item
    AddCustomItem {
        /// Item name
        name: String,
        /// Item category
        category: GearCategory,
    },
    /// Append a copy of a catalog item
    AddGearItem {
        /// Catalog item to copy
        item: GearItem,
    },
    /// Check or uncheck a staged item
    ToggleItem {
        /// Item to flip
        id: FlowItemId,
    },
    /// Remove a staged item
    RemoveItem {
        /// Item to remove
        id: FlowItemId,
    },
    /// Move to the personalization step
    ProceedToPersonalization,
    /// Return to template selection, keeping the staged flow
    BackToSelection,
    /// Hand the staged flow over and start again.
    ///
    /// Handled by [`crate::app::AppReducer`]; [`BuilderReducer`] leaves the
    /// session untouched so the staged flow is never dropped.
    Commit,
    /// Discard everything
    Reset,
}

/// Reducer for the flow builder session
#[derive(Clone, Debug, Default)]
pub struct BuilderReducer;

impl BuilderReducer {
    /// Creates a new `BuilderReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for BuilderReducer {
    type State = BuilderState;
    type Action = BuilderAction;
    type Environment = PackFlowEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BuilderAction::SelectTemplate { template } => {
                state.current_flow = Some(create_flow(&template, env.clock.now()));
                state.selected_template = Some(template.id);
            },
            BuilderAction::CreateCustomFlow { title } => {
                state.current_flow = Some(PackingFlow::custom(title, env.clock.now()));
                state.selected_template = None;
            },
            BuilderAction::AddCustomItem { name, category } => {
                state.push_item(FlowItem::new(name, category));
            },
            BuilderAction::AddGearItem { item } => {
                state.push_item(FlowItem::from_gear(&item));
            },
            BuilderAction::ToggleItem { id } => {
                if let Some(flow) = state.current_flow.as_mut() {
                    flow.toggle_item(id);
                }
            },
            BuilderAction::RemoveItem { id } => {
                if let Some(flow) = state.current_flow.as_mut() {
                    flow.remove_item(id);
                }
            },
            BuilderAction::ProceedToPersonalization => {
                if state.can_proceed() {
                    state.step = BuilderStep::Personalize;
                } else {
                    tracing::debug!("Cannot personalize without a staged flow");
                }
            },
            BuilderAction::BackToSelection => {
                state.step = BuilderStep::SelectTemplate;
            },
            // The staged flow has to land in the home feature, which this
            // reducer cannot reach; `AppReducer` intercepts Commit and calls
            // `take_committable`. On its own the session is left as is.
            BuilderAction::Commit => {
                tracing::debug!(committable = state.can_commit(), "Commit left to the app");
            },
            BuilderAction::Reset => {
                *state = BuilderState::default();
            },
        }

        SmallVec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::home::default_templates;
    use packflow_testing::{InMemoryKeyValueStore, ReducerTest, assertions, test_clock};
    use std::sync::Arc;

    fn env() -> PackFlowEnvironment {
        PackFlowEnvironment::new(
            Arc::new(test_clock()),
            Arc::new(InMemoryKeyValueStore::new()),
        )
    }

    fn staged(items: &[&str]) -> BuilderState {
        let mut flow = PackingFlow::custom("Swim", chrono::Utc::now());
        flow.items = items
            .iter()
            .map(|name| FlowItem::new(*name, GearCategory::Other))
            .collect();
        BuilderState {
            step: BuilderStep::Personalize,
            current_flow: Some(flow),
            selected_template: None,
        }
    }

    #[test]
    fn select_template_stages_copy() {
        let template = default_templates().remove(1);
        let template_id = template.id;

        ReducerTest::new(BuilderReducer::new())
            .with_env(env())
            .given_state(BuilderState::default())
            .when_action(BuilderAction::SelectTemplate { template })
            .then_state(move |state| {
                let flow = state.current_flow.as_ref().unwrap();
                assert_eq!(flow.title, "Gym Workout");
                assert_eq!(flow.items.len(), 5);
                assert_eq!(flow.template_id, Some(template_id));
                assert_eq!(state.selected_template, Some(template_id));
                assert_eq!(state.step, BuilderStep::SelectTemplate);
                assert!(state.can_proceed());
            })
            .run();
    }

    #[test]
    fn custom_flow_starts_empty() {
        ReducerTest::new(BuilderReducer::new())
            .with_env(env())
            .given_state(BuilderState::default())
            .when_action(BuilderAction::CreateCustomFlow {
                title: "Trail Run".to_string(),
            })
            .then_state(|state| {
                let flow = state.current_flow.as_ref().unwrap();
                assert!(flow.is_custom);
                assert!(flow.items.is_empty());
                assert!(flow.template_id.is_none());
                assert!(!state.can_commit());
                assert!(state.progress().abs() < f64::EPSILON);
            })
            .run();
    }

    #[test]
    fn cannot_personalize_without_flow() {
        ReducerTest::new(BuilderReducer::new())
            .with_env(env())
            .given_state(BuilderState::default())
            .when_action(BuilderAction::ProceedToPersonalization)
            .then_state(|state| assert_eq!(state.step, BuilderStep::SelectTemplate))
            .run();
    }

    #[test]
    fn back_to_selection_keeps_flow() {
        ReducerTest::new(BuilderReducer::new())
            .with_env(env())
            .given_state(staged(&["Goggles"]))
            .when_action(BuilderAction::BackToSelection)
            .then_state(|state| {
                assert_eq!(state.step, BuilderStep::SelectTemplate);
                assert!(state.current_flow.is_some());
            })
            .run();
    }

    #[test]
    fn add_gear_item_keeps_weak_reference() {
        let gear = GearItem::new("Fitness Tracker", GearCategory::Electronics);
        let gear_id = gear.id;

        ReducerTest::new(BuilderReducer::new())
            .with_env(env())
            .given_state(staged(&[]))
            .when_action(BuilderAction::AddGearItem { item: gear })
            .then_state(move |state| {
                let item = &state.current_flow.as_ref().unwrap().items[0];
                assert_eq!(item.gear_item_id, Some(gear_id));
                assert_eq!(item.name, "Fitness Tracker");
                assert_eq!(item.category, GearCategory::Electronics);
            })
            .run();
    }

    #[test]
    fn add_item_without_flow_is_a_no_op() {
        ReducerTest::new(BuilderReducer::new())
            .with_env(env())
            .given_state(BuilderState::default())
            .when_action(BuilderAction::AddCustomItem {
                name: "Cap".to_string(),
                category: GearCategory::Clothing,
            })
            .then_state(|state| assert_eq!(*state, BuilderState::default()))
            .run();
    }

    #[test]
    fn toggle_and_remove_by_id() {
        let state = staged(&["Goggles", "Towel"]);
        let goggles = state.current_flow.as_ref().unwrap().items[0].id;

        ReducerTest::new(BuilderReducer::new())
            .with_env(env())
            .given_state(state.clone())
            .when_action(BuilderAction::ToggleItem { id: goggles })
            .then_state(|state| assert!((state.progress() - 0.5).abs() < f64::EPSILON))
            .run();

        ReducerTest::new(BuilderReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(BuilderAction::RemoveItem { id: goggles })
            .then_state(|state| {
                let names: Vec<&str> = state
                    .current_flow
                    .as_ref()
                    .unwrap()
                    .items
                    .iter()
                    .map(|item| item.name.as_str())
                    .collect();
                assert_eq!(names, vec!["Towel"]);
            })
            .run();
    }

    #[test]
    fn commit_requires_items() {
        ReducerTest::new(BuilderReducer::new())
            .with_env(env())
            .given_state(staged(&[]))
            .when_action(BuilderAction::Commit)
            .then_state(|state| {
                assert!(state.current_flow.is_some());
                assert_eq!(state.step, BuilderStep::Personalize);
            })
            .run();
    }

    #[test]
    fn commit_keeps_staged_flow_without_coordinator() {
        let state = staged(&["Goggles"]);
        let expected = state.clone();

        ReducerTest::new(BuilderReducer::new())
            .with_env(env())
            .given_state(state)
            .when_action(BuilderAction::Commit)
            .then_state(move |state| {
                assert_eq!(*state, expected);
                assert!(state.can_commit());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn take_committable_resets_session() {
        let mut state = staged(&["Goggles"]);

        let flow = state.take_committable().unwrap();

        assert_eq!(flow.items[0].name, "Goggles");
        assert_eq!(state, BuilderState::default());
    }

    #[test]
    fn reset_is_unconditional() {
        ReducerTest::new(BuilderReducer::new())
            .with_env(env())
            .given_state(staged(&["Goggles"]))
            .when_action(BuilderAction::Reset)
            .then_state(|state| {
                assert_eq!(*state, BuilderState::default());
                assert!(!state.can_proceed());
            })
            .run();
    }
}
