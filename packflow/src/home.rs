//! Active flows and templates.

use crate::environment::PackFlowEnvironment;
use crate::storage::keys;
use crate::types::{
    FlowId, FlowItem, FlowItemId, FlowTemplate, GearCategory, PackingFlow, TemplateId,
};
use chrono::{DateTime, Utc};
use packflow_core::kv::{load_json, persist};
use packflow_core::{SmallVec, effect::Effect, reducer::Reducer};

/// State of the home screen: saved flows and the template library
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HomeState {
    /// Flows in creation order
    pub active_flows: Vec<PackingFlow>,
    /// Seeded templates
    pub templates: Vec<FlowTemplate>,
}

impl HomeState {
    /// Returns a flow by ID
    #[must_use]
    pub fn flow(&self, id: FlowId) -> Option<&PackingFlow> {
        self.active_flows.iter().find(|flow| flow.id == id)
    }

    /// Returns a template by ID
    #[must_use]
    pub fn template(&self, id: TemplateId) -> Option<&FlowTemplate> {
        self.templates.iter().find(|template| template.id == id)
    }

    /// Returns the number of active flows
    #[must_use]
    pub fn active_flow_count(&self) -> usize {
        self.active_flows.len()
    }

    /// Returns the number of flows built from scratch
    #[must_use]
    pub fn custom_flows_count(&self) -> usize {
        self.active_flows.iter().filter(|flow| flow.is_custom).count()
    }

    /// Flows with every item checked
    pub fn completed_flows(&self) -> impl Iterator<Item = &PackingFlow> {
        self.active_flows.iter().filter(|flow| flow.is_complete())
    }
}

/// Actions for the home screen
#[derive(Clone, Debug, PartialEq)]
pub enum HomeAction {
    /// Read flows and templates, seeding templates when there are none
    Load,
    /// Save a new flow
    AddActiveFlow {
        /// Flow to save
        flow: PackingFlow,
    },
    /// Remove a flow
    DeleteFlow {
        /// Flow to remove
        id: FlowId,
    },
    /// Check or uncheck an item of a saved flow
    ToggleFlowItem {
        /// Owning flow
        flow_id: FlowId,
        /// Item to flip
        item_id: FlowItemId,
    },
}

/// Materialize a flow from a template.
///
/// Items are copied with fresh ids and cleared checks; the weak gear
/// reference is kept. Does not touch any state.
#[must_use]
pub fn create_flow(template: &FlowTemplate, now: DateTime<Utc>) -> PackingFlow {
    PackingFlow {
        items: template.items.iter().map(FlowItem::fresh_copy).collect(),
        template_id: Some(template.id),
        ..PackingFlow::new(template.name.clone(), now)
    }
}

/// The templates a fresh install starts with
#[must_use]
pub fn default_templates() -> Vec<FlowTemplate> {
    use GearCategory::{Accessories, Clothing, Equipment, Footwear, Nutrition};

    fn items(entries: &[(&str, GearCategory)]) -> Vec<FlowItem> {
        entries
            .iter()
            .map(|(name, category)| FlowItem::new(*name, *category))
            .collect()
    }

    vec![
        FlowTemplate::new(
            "5K Run",
            "Essential items for a 5K run",
            items(&[
                ("Running Shoes", Footwear),
                ("Running Shorts", Clothing),
                ("T-Shirt", Clothing),
                ("Water Bottle", Accessories),
            ]),
        ),
        FlowTemplate::new(
            "Gym Workout",
            "Gym training essentials",
            items(&[
                ("Gym Shoes", Footwear),
                ("Workout Clothes", Clothing),
                ("Towel", Accessories),
                ("Water Bottle", Accessories),
                ("Gym Bag", Accessories),
            ]),
        ),
        FlowTemplate::new(
            "Weekend Bike Trip",
            "Equipment for a weekend cycling trip",
            items(&[
                ("Cycling Shoes", Footwear),
                ("Cycling Jersey", Clothing),
                ("Helmet", Equipment),
                ("Water Bottle", Accessories),
                ("Repair Kit", Equipment),
                ("Energy Bars", Nutrition),
            ]),
        ),
    ]
}

/// Reducer for active flows and templates
#[derive(Clone, Debug, Default)]
pub struct HomeReducer;

impl HomeReducer {
    /// Creates a new `HomeReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn save_flows(state: &HomeState, env: &PackFlowEnvironment) {
        persist(env.kv.as_ref(), keys::ACTIVE_FLOWS, &state.active_flows);
    }
}

impl Reducer for HomeReducer {
    type State = HomeState;
    type Action = HomeAction;
    type Environment = PackFlowEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            HomeAction::Load => {
                let kv = env.kv.as_ref();
                state.active_flows = load_json(kv, keys::ACTIVE_FLOWS).unwrap_or_default();
                state.templates = load_json(kv, keys::TEMPLATES).unwrap_or_default();

                if state.templates.is_empty() && env.config.seed_defaults {
                    tracing::info!("Seeding default templates");
                    state.templates = default_templates();
                    persist(kv, keys::TEMPLATES, &state.templates);
                }
                tracing::debug!(
                    flows = state.active_flows.len(),
                    templates = state.templates.len(),
                    "Flows loaded"
                );
            },
            HomeAction::AddActiveFlow { flow } => {
                tracing::debug!(id = %flow.id, title = %flow.title, "Adding flow");
                state.active_flows.push(flow);
                Self::save_flows(state, env);
            },
            HomeAction::DeleteFlow { id } => {
                state.active_flows.retain(|flow| flow.id != id);
                Self::save_flows(state, env);
            },
            HomeAction::ToggleFlowItem { flow_id, item_id } => {
                let toggled = state
                    .active_flows
                    .iter_mut()
                    .find(|flow| flow.id == flow_id)
                    .is_some_and(|flow| flow.toggle_item(item_id));

                if toggled {
                    Self::save_flows(state, env);
                } else {
                    tracing::debug!(%flow_id, %item_id, "Toggle of unknown flow item ignored");
                }
            },
        }

        SmallVec::new()
    }
}
