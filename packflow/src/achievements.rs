//! Achievement tracking.
//!
//! One record per [`AchievementType`], unlocked at most once. Other features
//! do not call into this module directly; the app coordinator evaluates a
//! [`Trigger`] with the updated count after each relevant change.
//!
//! A fresh unlock is also pushed onto a transient "recently unlocked" list.
//! The reducer schedules its removal as a cancellable delayed effect keyed by
//! the achievement id, so the display window is driven by the runtime timer
//! rather than by polling.

use crate::environment::PackFlowEnvironment;
use crate::storage::keys;
use crate::types::{Achievement, AchievementId, AchievementType};
use chrono::NaiveDate;
use packflow_core::effect::EffectId;
use packflow_core::kv::{load_json, persist};
use packflow_core::{SmallVec, cancellable, delay, effect::Effect, reducer::Reducer};

/// An updated count that may satisfy an achievement threshold
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Trigger {
    /// Number of active flows
    FlowCount(usize),
    /// Progress of one flow
    FlowProgress(f64),
    /// Number of catalog items
    CatalogCount(usize),
    /// Number of confirmed scans
    ScanCount(i64),
    /// Number of custom flows
    CustomFlowCount(usize),
    /// Consecutive active days
    ConsecutiveDays(i64),
}

impl Trigger {
    /// Achievements whose threshold this trigger meets
    #[must_use]
    pub fn unlocks(self) -> SmallVec<[AchievementType; 2]> {
        let mut unlocked = SmallVec::new();
        match self {
            Self::FlowCount(count) => {
                if count >= 1 {
                    unlocked.push(AchievementType::FirstFlow);
                }
                if count >= 10 {
                    unlocked.push(AchievementType::TenFlows);
                }
            },
            Self::FlowProgress(progress) if progress >= 1.0 => {
                unlocked.push(AchievementType::PerfectPack);
            },
            Self::CatalogCount(count) if count >= 20 => {
                unlocked.push(AchievementType::CatalogMaster);
            },
            Self::ScanCount(count) if count >= 5 => {
                unlocked.push(AchievementType::ScannerPro);
            },
            Self::CustomFlowCount(count) if count >= 5 => {
                unlocked.push(AchievementType::CustomFlowCreator);
            },
            Self::ConsecutiveDays(days) if days >= 7 => {
                unlocked.push(AchievementType::WeeklyActive);
            },
            _ => {},
        }
        unlocked
    }
}

/// Achievement records plus the daily-activity streak
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AchievementState {
    /// One record per type
    pub achievements: Vec<Achievement>,
    /// Unlocked within the display window, oldest first
    pub recently_unlocked: Vec<Achievement>,
    /// Consecutive calendar days with activity
    pub consecutive_days: i64,
    /// Last calendar day with activity
    pub last_active_day: Option<NaiveDate>,
}

impl AchievementState {
    /// Returns the record for `kind`
    #[must_use]
    pub fn get(&self, kind: AchievementType) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.kind == kind)
    }

    /// Whether `kind` is unlocked
    #[must_use]
    pub fn is_unlocked(&self, kind: AchievementType) -> bool {
        self.get(kind).is_some_and(|a| a.is_unlocked)
    }

    /// Returns the number of unlocked achievements
    #[must_use]
    pub fn unlocked_count(&self) -> usize {
        self.achievements.iter().filter(|a| a.is_unlocked).count()
    }

    /// Returns the number of achievements
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.achievements.len()
    }
}

/// Actions for the achievement tracker
#[derive(Clone, Debug, PartialEq)]
pub enum AchievementAction {
    /// Read records and the streak, creating missing records
    Load,
    /// Unlock one achievement
    Unlock {
        /// Achievement to unlock
        kind: AchievementType,
    },
    /// Unlock whatever `trigger` satisfies
    Evaluate {
        /// Updated count
        trigger: Trigger,
    },
    /// Update the streak for today
    RecordDailyActivity,
    /// Drop an entry from the recently-unlocked list
    DismissRecent {
        /// Entry to drop
        id: AchievementId,
    },
    /// Drop every recently-unlocked entry now
    ClearRecent,
}

/// Key of the delayed effect that dismisses a recently-unlocked entry
fn dismissal_id(id: AchievementId) -> String {
    format!("achievement-toast-{id}")
}

/// Reducer for achievements
#[derive(Clone, Debug, Default)]
pub struct AchievementReducer;

impl AchievementReducer {
    /// Creates a new `AchievementReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn unlock(
        state: &mut AchievementState,
        kind: AchievementType,
        env: &PackFlowEnvironment,
    ) -> Option<Effect<AchievementAction>> {
        let achievement = state
            .achievements
            .iter_mut()
            .find(|a| a.kind == kind && !a.is_unlocked)?;

        achievement.is_unlocked = true;
        achievement.unlocked_at = Some(env.clock.now());
        let unlocked = achievement.clone();

        tracing::info!(achievement = kind.title(), "Achievement unlocked");
        persist(env.kv.as_ref(), keys::ACHIEVEMENTS, &state.achievements);

        let id = unlocked.id;
        state.recently_unlocked.push(unlocked);

        Some(cancellable! {
            id: dismissal_id(id),
            effect: delay! {
                duration: env.config.recently_unlocked_window,
                action: AchievementAction::DismissRecent { id }
            }
        })
    }

    fn evaluate(
        state: &mut AchievementState,
        trigger: Trigger,
        env: &PackFlowEnvironment,
    ) -> SmallVec<[Effect<AchievementAction>; 4]> {
        trigger
            .unlocks()
            .into_iter()
            .filter_map(|kind| Self::unlock(state, kind, env))
            .collect()
    }

    fn load(state: &mut AchievementState, env: &PackFlowEnvironment) {
        let kv = env.kv.as_ref();
        let mut achievements: Vec<Achievement> =
            load_json(kv, keys::ACHIEVEMENTS).unwrap_or_default();

        let missing: Vec<AchievementType> = AchievementType::ALL
            .into_iter()
            .filter(|kind| !achievements.iter().any(|a| a.kind == *kind))
            .collect();
        if !missing.is_empty() {
            tracing::debug!(count = missing.len(), "Creating missing achievement records");
            achievements.extend(missing.into_iter().map(Achievement::locked));
            persist(kv, keys::ACHIEVEMENTS, &achievements);
        }

        state.achievements = achievements;
        state.consecutive_days = kv.get_int(keys::CONSECUTIVE_DAYS);
        state.last_active_day = load_json(kv, keys::LAST_ACTIVE_DATE);
    }

    fn record_daily_activity(state: &mut AchievementState, env: &PackFlowEnvironment) {
        let today = env.clock.today();

        match state.last_active_day.map(|last| (today - last).num_days()) {
            None => state.consecutive_days = 1,
            Some(1) => state.consecutive_days += 1,
            Some(days) if days > 1 => state.consecutive_days = 1,
            // Same day, or the clock moved backwards
            Some(_) => {},
        }
        state.last_active_day = Some(today);

        let kv = env.kv.as_ref();
        if let Err(error) = kv.set_int(keys::CONSECUTIVE_DAYS, state.consecutive_days) {
            tracing::warn!(%error, "Failed to persist consecutive days");
        }
        persist(kv, keys::LAST_ACTIVE_DATE, &today);

        tracing::debug!(%today, streak = state.consecutive_days, "Daily activity recorded");
    }
}

impl Reducer for AchievementReducer {
    type State = AchievementState;
    type Action = AchievementAction;
    type Environment = PackFlowEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AchievementAction::Load => {
                Self::load(state, env);
                SmallVec::new()
            },
            AchievementAction::Unlock { kind } => {
                Self::unlock(state, kind, env).into_iter().collect()
            },
            AchievementAction::Evaluate { trigger } => Self::evaluate(state, trigger, env),
            AchievementAction::RecordDailyActivity => {
                Self::record_daily_activity(state, env);
                Self::evaluate(state, Trigger::ConsecutiveDays(state.consecutive_days), env)
            },
            AchievementAction::DismissRecent { id } => {
                state.recently_unlocked.retain(|a| a.id != id);
                SmallVec::new()
            },
            AchievementAction::ClearRecent => state
                .recently_unlocked
                .drain(..)
                .map(|a| Effect::Cancel {
                    id: EffectId::new(dismissal_id(a.id)),
                })
                .collect(),
        }
    }
}
