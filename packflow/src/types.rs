//! Domain types for PackFlow.
//!
//! Plain records with derived fields only. Every entity carries a typed
//! UUID identifier assigned at creation and never reassigned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random `", stringify!($name), "`")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Creates a `", stringify!($name), "` from a UUID")]
            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Returns the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a gear item
    GearItemId
);
entity_id!(
    /// Unique identifier for an item inside a flow or template
    FlowItemId
);
entity_id!(
    /// Unique identifier for a packing flow
    FlowId
);
entity_id!(
    /// Unique identifier for a flow template
    TemplateId
);
entity_id!(
    /// Unique identifier for an achievement record
    AchievementId
);

/// Grouping and filter key for gear
///
/// Declaration order is the display order used when grouping by category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GearCategory {
    /// Shoes, boots, sandals
    Footwear,
    /// Anything worn
    Clothing,
    /// Bags, bottles, towels
    Accessories,
    /// Trackers, phones, headphones
    Electronics,
    /// Sport-specific equipment
    Equipment,
    /// Food and drink
    Nutrition,
    /// Everything else
    Other,
}

impl GearCategory {
    /// Every category in display order
    pub const ALL: [Self; 7] = [
        Self::Footwear,
        Self::Clothing,
        Self::Accessories,
        Self::Electronics,
        Self::Equipment,
        Self::Nutrition,
        Self::Other,
    ];

    /// Display name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Footwear => "Footwear",
            Self::Clothing => "Clothing",
            Self::Accessories => "Accessories",
            Self::Electronics => "Electronics",
            Self::Equipment => "Equipment",
            Self::Nutrition => "Nutrition",
            Self::Other => "Other",
        }
    }

    /// Icon symbol name
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Footwear => "shoe.fill",
            Self::Clothing => "tshirt.fill",
            Self::Accessories => "bag.fill",
            Self::Electronics => "iphone",
            Self::Equipment => "figure.run",
            Self::Nutrition => "drop.fill",
            Self::Other => "square.fill",
        }
    }
}

impl std::fmt::Display for GearCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A piece of gear in the user's catalog
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GearItem {
    /// Unique identifier
    pub id: GearItemId,
    /// Display name
    pub name: String,
    /// Category
    pub category: GearCategory,
    /// Optional image reference
    pub image_ref: Option<String>,
    /// When the item was last packed or unpacked
    pub last_used_at: Option<DateTime<Utc>>,
    /// Whether the item is currently packed
    pub is_packed: bool,
}

impl GearItem {
    /// Creates an unpacked item with a fresh id
    #[must_use]
    pub fn new(name: impl Into<String>, category: GearCategory) -> Self {
        Self {
            id: GearItemId::new(),
            name: name.into(),
            category,
            image_ref: None,
            last_used_at: None,
            is_packed: false,
        }
    }

    /// Stamps the last-used time
    #[must_use]
    pub fn last_used(mut self, at: DateTime<Utc>) -> Self {
        self.last_used_at = Some(at);
        self
    }
}

/// An entry in a flow or template
///
/// Name and category are copied from the source gear item; `gear_item_id` is
/// a weak reference that is never resolved or kept in sync.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowItem {
    /// Unique identifier
    pub id: FlowItemId,
    /// Catalog item this entry was copied from
    pub gear_item_id: Option<GearItemId>,
    /// Display name
    pub name: String,
    /// Category
    pub category: GearCategory,
    /// Whether the entry has been packed
    pub is_checked: bool,
}

impl FlowItem {
    /// Creates an unchecked, freestanding entry
    #[must_use]
    pub fn new(name: impl Into<String>, category: GearCategory) -> Self {
        Self {
            id: FlowItemId::new(),
            gear_item_id: None,
            name: name.into(),
            category,
            is_checked: false,
        }
    }

    /// Creates an unchecked entry copied from a catalog item
    #[must_use]
    pub fn from_gear(item: &GearItem) -> Self {
        Self {
            id: FlowItemId::new(),
            gear_item_id: Some(item.id),
            name: item.name.clone(),
            category: item.category,
            is_checked: false,
        }
    }

    /// Copy with a fresh id and the check cleared
    #[must_use]
    pub fn fresh_copy(&self) -> Self {
        Self {
            id: FlowItemId::new(),
            is_checked: false,
            ..self.clone()
        }
    }
}

/// A packing checklist
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingFlow {
    /// Unique identifier
    pub id: FlowId,
    /// Display title
    pub title: String,
    /// Entries in display order
    pub items: Vec<FlowItem>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Always `false`; kept so persisted flows keep their shape
    pub is_template: bool,
    /// Template the flow was created from
    pub template_id: Option<TemplateId>,
    /// Whether the user built the flow from scratch
    pub is_custom: bool,
}

impl PackingFlow {
    /// Creates an empty, non-custom flow
    #[must_use]
    pub fn new(title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: FlowId::new(),
            title: title.into(),
            items: Vec::new(),
            created_at,
            is_template: false,
            template_id: None,
            is_custom: false,
        }
    }

    /// Creates an empty custom flow
    #[must_use]
    pub fn custom(title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            is_custom: true,
            ..Self::new(title, created_at)
        }
    }

    /// Number of checked entries
    #[must_use]
    pub fn checked_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_checked).count()
    }

    /// Fraction of checked entries, 0.0 for an empty flow
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        self.checked_count() as f64 / self.items.len() as f64
    }

    /// Progress as a truncated whole percentage
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn progress_percent(&self) -> u32 {
        (self.progress() * 100.0) as u32
    }

    /// Whether every entry is checked (and there is at least one)
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Looks up an entry by id
    #[must_use]
    pub fn item(&self, id: FlowItemId) -> Option<&FlowItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Flips an entry's check; returns `false` when the id is absent
    pub fn toggle_item(&mut self, id: FlowItemId) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.is_checked = !item.is_checked;
                true
            },
            None => false,
        }
    }

    /// Removes an entry; returns `false` when the id is absent
    pub fn remove_item(&mut self, id: FlowItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }
}

/// A reusable stencil for flows
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowTemplate {
    /// Unique identifier
    pub id: TemplateId,
    /// Display name, used as the title of flows created from it
    pub name: String,
    /// Short description
    pub description: String,
    /// Unchecked entries
    pub items: Vec<FlowItem>,
}

impl FlowTemplate {
    /// Creates a template from unchecked entries
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        items: Vec<FlowItem>,
    ) -> Self {
        Self {
            id: TemplateId::new(),
            name: name.into(),
            description: description.into(),
            items,
        }
    }
}

/// The fixed set of achievements
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementType {
    /// At least one active flow
    FirstFlow,
    /// At least ten active flows
    TenFlows,
    /// A flow reached 100%
    PerfectPack,
    /// Twenty catalog items
    CatalogMaster,
    /// Five confirmed scans
    ScannerPro,
    /// Five custom flows
    CustomFlowCreator,
    /// Seven consecutive active days
    WeeklyActive,
}

impl AchievementType {
    /// Every type in display order
    pub const ALL: [Self; 7] = [
        Self::FirstFlow,
        Self::TenFlows,
        Self::PerfectPack,
        Self::CatalogMaster,
        Self::ScannerPro,
        Self::CustomFlowCreator,
        Self::WeeklyActive,
    ];

    /// Display title
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::FirstFlow => "First Steps",
            Self::TenFlows => "Packing Pro",
            Self::PerfectPack => "Perfect Pack",
            Self::CatalogMaster => "Catalog Master",
            Self::ScannerPro => "Scanner Pro",
            Self::CustomFlowCreator => "Custom Creator",
            Self::WeeklyActive => "Weekly Warrior",
        }
    }

    /// One-line description of the goal
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::FirstFlow => "Create your first packing flow",
            Self::TenFlows => "Create 10 packing flows",
            Self::PerfectPack => "Complete a flow with 100% items",
            Self::CatalogMaster => "Add 20 items to your catalog",
            Self::ScannerPro => "Scan 5 items using barcode scanner",
            Self::CustomFlowCreator => "Create 5 custom flows",
            Self::WeeklyActive => "Use the app 7 days in a row",
        }
    }

    /// Icon symbol name
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::FirstFlow => "star.fill",
            Self::TenFlows => "star.circle.fill",
            Self::PerfectPack => "checkmark.seal.fill",
            Self::CatalogMaster => "square.grid.3x3.fill",
            Self::ScannerPro => "barcode.viewfinder",
            Self::CustomFlowCreator => "pencil.circle.fill",
            Self::WeeklyActive => "calendar",
        }
    }
}

/// Unlock state of one achievement type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    /// Unique identifier
    pub id: AchievementId,
    /// Which achievement this record tracks
    #[serde(rename = "type")]
    pub kind: AchievementType,
    /// Monotonic: never reverts to `false`
    pub is_unlocked: bool,
    /// When the achievement was unlocked
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    /// Creates a locked record
    #[must_use]
    pub fn locked(kind: AchievementType) -> Self {
        Self {
            id: AchievementId::new(),
            kind,
            is_unlocked: false,
            unlocked_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn flow_with(checks: &[bool]) -> PackingFlow {
        let mut flow = PackingFlow::new("Run", Utc::now());
        flow.items = checks
            .iter()
            .map(|checked| FlowItem {
                is_checked: *checked,
                ..FlowItem::new("Item", GearCategory::Other)
            })
            .collect();
        flow
    }

    #[test]
    fn empty_flow_has_zero_progress() {
        let flow = PackingFlow::new("Empty", Utc::now());
        assert!(flow.progress().abs() < f64::EPSILON);
        assert_eq!(flow.progress_percent(), 0);
        assert!(!flow.is_complete());
    }

    #[test]
    fn half_checked_flow() {
        let mut flow = flow_with(&[true, false]);
        assert!((flow.progress() - 0.5).abs() < f64::EPSILON);
        assert_eq!(flow.progress_percent(), 50);

        let second = flow.items[1].id;
        assert!(flow.toggle_item(second));
        assert!(flow.is_complete());
    }

    #[test]
    fn percent_truncates() {
        let flow = flow_with(&[true, false, false]);
        assert_eq!(flow.progress_percent(), 33);
    }

    #[test]
    fn missing_item_is_a_no_op() {
        let mut flow = flow_with(&[false]);
        assert!(!flow.toggle_item(FlowItemId::new()));
        assert!(!flow.remove_item(FlowItemId::new()));
        assert_eq!(flow.checked_count(), 0);
        assert_eq!(flow.items.len(), 1);
    }

    #[test]
    fn fresh_copy_keeps_weak_reference() {
        let gear = GearItem::new("Gym Bag", GearCategory::Accessories);
        let item = FlowItem {
            is_checked: true,
            ..FlowItem::from_gear(&gear)
        };

        let copy = item.fresh_copy();
        assert_ne!(copy.id, item.id);
        assert_eq!(copy.gear_item_id, Some(gear.id));
        assert_eq!(copy.name, "Gym Bag");
        assert!(!copy.is_checked);
    }

    #[test]
    fn achievement_type_serializes_snake_case() {
        let json = serde_json::to_string(&AchievementType::CustomFlowCreator).unwrap();
        assert_eq!(json, "\"custom_flow_creator\"");

        let record = serde_json::to_value(Achievement::locked(AchievementType::FirstFlow)).unwrap();
        assert_eq!(record["type"], "first_flow");
        assert_eq!(record["isUnlocked"], false);
    }

    #[test]
    fn gear_item_serializes_camel_case() {
        let item = GearItem::new("Yoga Mat", GearCategory::Equipment);
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["category"], "Equipment");
        assert_eq!(value["isPacked"], false);
        assert!(value["lastUsedAt"].is_null());
        assert_eq!(value["id"], item.id.to_string());
    }

    proptest! {
        #[test]
        fn progress_is_checked_over_total(
            checks in proptest::collection::vec(any::<bool>(), 0..40)
        ) {
            let flow = flow_with(&checks);
            let checked = checks.iter().filter(|c| **c).count();

            prop_assert!((0.0..=1.0).contains(&flow.progress()));
            if checks.is_empty() {
                prop_assert!(flow.progress().abs() < f64::EPSILON);
            } else {
                #[allow(clippy::cast_precision_loss)]
                let expected = checked as f64 / checks.len() as f64;
                prop_assert!((flow.progress() - expected).abs() < 1e-12);
            }
            prop_assert_eq!(flow.is_complete(), !checks.is_empty() && checked == checks.len());
        }
    }
}
