//! Gear catalog feature.
//!
//! Owns the user's gear items. Every mutation rewrites the whole collection
//! under [`keys::GEAR_ITEMS`].

use crate::environment::PackFlowEnvironment;
use crate::storage::keys;
use crate::types::{GearCategory, GearItem, GearItemId};
use packflow_core::kv::{load_json, persist};
use packflow_core::{SmallVec, effect::Effect, reducer::Reducer};

/// Filter applied by [`CatalogState::list`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GearFilter {
    /// Case-insensitive substring of the name; empty matches everything
    pub text_query: Option<String>,
    /// Exact category match
    pub category: Option<GearCategory>,
    /// Only packed items
    pub packed_only: bool,
}

impl GearFilter {
    /// Match names containing `query`
    #[must_use]
    pub fn with_text(mut self, query: impl Into<String>) -> Self {
        self.text_query = Some(query.into());
        self
    }

    /// Match a single category
    #[must_use]
    pub const fn with_category(mut self, category: GearCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Match packed items only
    #[must_use]
    pub const fn packed_only(mut self) -> Self {
        self.packed_only = true;
        self
    }

    fn matches(&self, item: &GearItem, needle: Option<&str>) -> bool {
        needle.is_none_or(|needle| item.name.to_lowercase().contains(needle))
            && self.category.is_none_or(|category| item.category == category)
            && (!self.packed_only || item.is_packed)
    }
}

/// State of the gear catalog
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogState {
    /// Items in insertion order
    pub items: Vec<GearItem>,
}

impl CatalogState {
    /// Items matching `filter`, sorted by name
    #[must_use]
    pub fn list(&self, filter: &GearFilter) -> Vec<GearItem> {
        let needle = filter
            .text_query
            .as_deref()
            .filter(|query| !query.is_empty())
            .map(str::to_lowercase);

        let mut items: Vec<GearItem> = self
            .items
            .iter()
            .filter(|item| filter.matches(item, needle.as_deref()))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }

    /// Returns an item by ID
    #[must_use]
    pub fn get(&self, id: GearItemId) -> Option<&GearItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Returns the number of items
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Returns the number of items in `category`
    #[must_use]
    pub fn count_by_category(&self, category: GearCategory) -> usize {
        self.items
            .iter()
            .filter(|item| item.category == category)
            .count()
    }

    /// Returns the number of packed items
    #[must_use]
    pub fn packed_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_packed).count()
    }
}

/// Actions for the gear catalog
#[derive(Clone, Debug, PartialEq)]
pub enum CatalogAction {
    /// Read the persisted catalog, seeding defaults when it is empty
    Load,
    /// Append an item (no duplicate detection)
    Add {
        /// Item to add
        item: GearItem,
    },
    /// Replace the item with the same id
    Update {
        /// Replacement
        item: GearItem,
    },
    /// Remove an item
    Delete {
        /// Item to remove
        id: GearItemId,
    },
    /// Flip the packed flag and stamp the last-used time
    TogglePacked {
        /// Item to toggle
        id: GearItemId,
    },
}

/// The items a fresh catalog starts with
#[must_use]
pub fn default_gear_items() -> Vec<GearItem> {
    [
        ("Nike Running Shoes", GearCategory::Footwear),
        ("Adidas Workout Shorts", GearCategory::Clothing),
        ("Under Armour T-Shirt", GearCategory::Clothing),
        ("Gym Bag", GearCategory::Accessories),
        ("Water Bottle", GearCategory::Accessories),
        ("Fitness Tracker", GearCategory::Electronics),
        ("Yoga Mat", GearCategory::Equipment),
    ]
    .into_iter()
    .map(|(name, category)| GearItem::new(name, category))
    .collect()
}

/// Reducer for the gear catalog
#[derive(Clone, Debug, Default)]
pub struct CatalogReducer;

impl CatalogReducer {
    /// Creates a new `CatalogReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn save(state: &CatalogState, env: &PackFlowEnvironment) {
        persist(env.kv.as_ref(), keys::GEAR_ITEMS, &state.items);
    }
}

impl Reducer for CatalogReducer {
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = PackFlowEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CatalogAction::Load => {
                state.items = load_json(env.kv.as_ref(), keys::GEAR_ITEMS).unwrap_or_default();
                if state.items.is_empty() && env.config.seed_defaults {
                    tracing::info!("Seeding default gear items");
                    state.items = default_gear_items();
                    Self::save(state, env);
                }
                tracing::debug!(count = state.items.len(), "Catalog loaded");
            },
            CatalogAction::Add { item } => {
                tracing::debug!(id = %item.id, name = %item.name, "Adding gear item");
                state.items.push(item);
                Self::save(state, env);
            },
            CatalogAction::Update { item } => {
                if let Some(existing) = state.items.iter_mut().find(|i| i.id == item.id) {
                    *existing = item;
                    Self::save(state, env);
                } else {
                    tracing::debug!(id = %item.id, "Update of unknown gear item ignored");
                }
            },
            CatalogAction::Delete { id } => {
                state.items.retain(|item| item.id != id);
                Self::save(state, env);
            },
            CatalogAction::TogglePacked { id } => {
                if let Some(item) = state.items.iter_mut().find(|item| item.id == id) {
                    item.is_packed = !item.is_packed;
                    item.last_used_at = Some(env.clock.now());
                    Self::save(state, env);
                } else {
                    tracing::debug!(%id, "Toggle of unknown gear item ignored");
                }
            },
        }

        SmallVec::new()
    }
}
