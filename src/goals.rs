//! Goal store
//!
//! Holds the ordered goal collection and writes the whole collection through
//! to the key-value store on every change. Partial writes are never issued;
//! readers of the stored value always see a complete collection.
//!
//! Mutations addressed by id report whether a goal matched. An unknown id is a
//! silent no-op (`Ok(false)`) and nothing is written.
//!
//! Quick-log operations (`log_workout`, `log_sleep`, `log_meal`) update every
//! goal that looks like it tracks that activity, in one write.

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::{StateError, ValidationError};
use crate::storage::KeyValueStore;
use crate::types::{Goal, GoalCategory};

/// Maximum title length accepted from input
pub const MAX_TITLE_LEN: usize = 50;
/// Maximum description length accepted from input
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Raw goal input as entered by the user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    /// Target as typed; must parse to a positive number
    pub target: String,
    /// Unit label; the category's default unit when blank
    pub unit: Option<String>,
}

impl GoalDraft {
    /// Validate the draft and build a new goal with a fresh id
    pub fn into_goal(self, now: DateTime<Utc>) -> Result<Goal, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::TitleRequired);
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TitleTooLong { max: MAX_TITLE_LEN });
        }

        let description = self.description.trim();
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::DescriptionTooLong {
                max: MAX_DESCRIPTION_LEN,
            });
        }

        let target = parse_target(&self.target)?;

        let category = GoalCategory::from_label(self.category.trim());
        let unit = match self.unit.as_deref().map(str::trim) {
            Some(unit) if !unit.is_empty() => unit.to_string(),
            _ => category.default_unit().to_string(),
        };

        Ok(Goal {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            target,
            current: 0.0,
            unit,
            category: category.as_str().to_string(),
            completed: false,
            created_at: now,
            progress: 0,
        })
    }
}

fn parse_target(raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::TargetRequired);
    }
    match raw.parse::<f64>() {
        Ok(target) if target.is_finite() && target > 0.0 => Ok(target),
        _ => Err(ValidationError::TargetInvalid),
    }
}

/// The three starter goals seeded on first run and after sign-out
pub fn default_goals(now: DateTime<Utc>) -> Vec<Goal> {
    let starter = |id: &str,
                   title: &str,
                   description: &str,
                   target: f64,
                   unit: &str,
                   category: &str| Goal {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        target,
        current: 0.0,
        unit: unit.to_string(),
        category: category.to_string(),
        completed: false,
        created_at: now,
        progress: 0,
    };

    vec![
        starter("1", "Daily Steps", "Walk 10,000 steps", 10000.0, "steps", "Activity"),
        starter("2", "Water Intake", "Drink 8 glasses of water", 8.0, "glasses", "Nutrition"),
        starter("3", "Exercise", "30 minutes of exercise", 30.0, "minutes", "Activity"),
    ]
}

/// Hours slept between two wall-clock times, rounded to 0.1 h.
///
/// A wake time earlier than the bedtime is taken to be on the next day.
pub fn sleep_hours(bedtime: NaiveTime, wake_time: NaiveTime) -> f64 {
    let bed = bedtime.num_seconds_from_midnight() / 60;
    let mut wake = wake_time.num_seconds_from_midnight() / 60;
    if wake < bed {
        wake += 24 * 60;
    }
    (f64::from(wake - bed) / 60.0 * 10.0).round() / 10.0
}

fn parse_clock(raw: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| ValidationError::SleepTimeInvalid)
}

fn title_mentions(goal: &Goal, words: &[&str]) -> bool {
    let title = goal.title.to_lowercase();
    words.iter().any(|w| title.contains(w))
}

/// Set `current` (clamped at 0) and derive `progress`/`completed` from it
fn apply_current(goal: &mut Goal, new_current: f64) {
    let current = new_current.max(0.0);
    goal.current = current;
    goal.progress = Goal::progress_for(current, goal.target);
    if goal.target > 0.0 {
        goal.completed = current >= goal.target;
    }
}

fn check_unique_ids(goals: &[Goal]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for goal in goals {
        if !seen.insert(goal.id.as_str()) {
            return Err(ValidationError::DuplicateGoalId {
                id: goal.id.clone(),
            });
        }
    }
    Ok(())
}

/// Parse a stored collection record by record.
///
/// Records that fail to parse or repeat an earlier id are dropped. Returns the
/// usable goals and how many were dropped, or `None` when nothing is usable.
fn parse_collection(key: &str, raw: &str) -> Option<(Vec<Goal>, usize)> {
    let records = match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(records) => records,
        Err(e) => {
            warn!(key, error = %e, "discarding malformed goal collection");
            return None;
        }
    };

    let mut goals: Vec<Goal> = Vec::with_capacity(records.len());
    let mut seen = HashSet::new();
    let mut dropped = 0;
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Goal>(record) {
            Ok(goal) if seen.insert(goal.id.clone()) => goals.push(goal),
            Ok(goal) => {
                warn!(key, index, id = %goal.id, "dropping goal with duplicate id");
                dropped += 1;
            }
            Err(e) => {
                warn!(key, index, error = %e, "dropping malformed goal");
                dropped += 1;
            }
        }
    }

    if goals.is_empty() && dropped > 0 {
        return None;
    }
    Some((goals, dropped))
}

/// Ordered, write-through goal collection
pub struct GoalStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    goals: Vec<Goal>,
}

impl GoalStore {
    /// Create an empty store persisting under `key`. Call [`GoalStore::load`] before use.
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            goals: Vec::new(),
        }
    }

    /// Current in-memory snapshot
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Look up a goal by id
    pub fn get(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    /// Load the collection. Absent or malformed data is replaced by the
    /// default set, which is persisted immediately.
    ///
    /// Individual records that fail to parse, or repeat an earlier id, are
    /// dropped and the cleaned collection is written back. Only when no record
    /// survives is the collection reseeded.
    pub async fn load(&mut self, now: DateTime<Utc>) -> Result<&[Goal], StateError> {
        let stored = self.storage.get(&self.key).await?;

        match stored.and_then(|raw| parse_collection(&self.key, &raw)) {
            Some((goals, 0)) => self.goals = goals,
            Some((goals, dropped)) => {
                debug!(key = %self.key, dropped, "rewriting cleaned goal collection");
                self.commit(goals).await?;
            }
            None => {
                debug!(key = %self.key, "seeding default goals");
                self.commit(default_goals(now)).await?;
            }
        }
        Ok(&self.goals)
    }

    /// Validate and append a new goal. Returns the created goal.
    pub async fn add(&mut self, draft: GoalDraft, now: DateTime<Utc>) -> Result<Goal, StateError> {
        let goal = draft.into_goal(now)?;
        let mut next = self.goals.clone();
        next.push(goal.clone());
        self.commit(next).await?;
        Ok(goal)
    }

    /// Mark a goal completed without touching its progress
    pub async fn complete(&mut self, id: &str) -> Result<bool, StateError> {
        self.modify(id, |goal| goal.completed = true).await
    }

    /// Flip a goal's completed flag
    pub async fn toggle_complete(&mut self, id: &str) -> Result<bool, StateError> {
        self.modify(id, |goal| goal.completed = !goal.completed).await
    }

    /// Set a goal's progress amount.
    ///
    /// Negative values clamp to 0. With a positive target, `progress` is
    /// recomputed and `completed` follows `current >= target`; with a
    /// non-positive target `progress` is 0 and `completed` is left alone.
    pub async fn update_current(&mut self, id: &str, new_current: f64) -> Result<bool, StateError> {
        self.modify(id, |goal| apply_current(goal, new_current)).await
    }

    /// Replace the goal with `old_id` by `goal`, keeping `old_id`
    pub async fn swap(&mut self, old_id: &str, goal: Goal) -> Result<bool, StateError> {
        self.modify(old_id, |slot| {
            *slot = Goal {
                id: slot.id.clone(),
                ..goal
            };
        })
        .await
    }

    /// Delete a goal
    pub async fn remove(&mut self, id: &str) -> Result<bool, StateError> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let next = self.goals.iter().filter(|g| g.id != id).cloned().collect();
        self.commit(next).await?;
        Ok(true)
    }

    /// Bulk-replace the whole collection. Ids must be unique.
    pub async fn replace_all(&mut self, goals: Vec<Goal>) -> Result<(), StateError> {
        check_unique_ids(&goals)?;
        self.commit(goals).await
    }

    /// Replace the collection with the default starter set
    pub async fn reset_to_default(&mut self, now: DateTime<Utc>) -> Result<(), StateError> {
        self.commit(default_goals(now)).await
    }

    /// Add a workout's minutes to Activity goals titled as exercise or workout
    /// goals. Returns how many goals were updated.
    pub async fn log_workout(&mut self, minutes: u32) -> Result<usize, StateError> {
        if minutes == 0 {
            return Err(ValidationError::DurationInvalid.into());
        }
        let minutes = f64::from(minutes);
        self.modify_matching(
            |goal| {
                goal.category_kind() == GoalCategory::Activity
                    && title_mentions(goal, &["exercise", "workout"])
            },
            |goal| {
                let next = goal.current + minutes;
                apply_current(goal, next)
            },
        )
        .await
    }

    /// Record a night's sleep from `HH:MM` bed and wake times. Sleep goals, and
    /// goals with "sleep" in the title, have `current` set to the hours slept.
    pub async fn log_sleep(&mut self, bedtime: &str, wake_time: &str) -> Result<usize, StateError> {
        let hours = sleep_hours(parse_clock(bedtime)?, parse_clock(wake_time)?);
        self.modify_matching(
            |goal| {
                goal.category_kind() == GoalCategory::Sleep || title_mentions(goal, &["sleep"])
            },
            |goal| apply_current(goal, hours),
        )
        .await
    }

    /// Add a meal's calories to Nutrition goals and goals titled with
    /// "calorie" or "nutrition". Returns how many goals were updated.
    pub async fn log_meal(&mut self, calories: i64) -> Result<usize, StateError> {
        if calories <= 0 {
            return Err(ValidationError::CaloriesInvalid.into());
        }
        let calories = calories as f64;
        self.modify_matching(
            |goal| {
                goal.category_kind() == GoalCategory::Nutrition
                    || title_mentions(goal, &["calorie", "nutrition"])
            },
            |goal| {
                let next = goal.current + calories;
                apply_current(goal, next)
            },
        )
        .await
    }

    async fn modify_matching<P, F>(&mut self, matches: P, apply: F) -> Result<usize, StateError>
    where
        P: Fn(&Goal) -> bool,
        F: Fn(&mut Goal),
    {
        let mut next = self.goals.clone();
        let mut updated = 0;
        for goal in next.iter_mut() {
            if matches(&*goal) {
                apply(goal);
                updated += 1;
            }
        }
        if updated == 0 {
            debug!("no matching goals, nothing to update");
            return Ok(0);
        }
        self.commit(next).await?;
        Ok(updated)
    }

    async fn modify<F>(&mut self, id: &str, apply: F) -> Result<bool, StateError>
    where
        F: FnOnce(&mut Goal),
    {
        let Some(index) = self.goals.iter().position(|g| g.id == id) else {
            debug!(id, "goal not found, nothing to update");
            return Ok(false);
        };
        let mut next = self.goals.clone();
        apply(&mut next[index]);
        self.commit(next).await?;
        Ok(true)
    }

    /// Persist `next`, then adopt it as the in-memory state
    async fn commit(&mut self, next: Vec<Goal>) -> Result<(), StateError> {
        let json = serde_json::to_string(&next)?;
        if let Err(e) = self.storage.set(&self.key, &json).await {
            error!(key = %self.key, error = %e, "failed to persist goals");
            return Err(e.into());
        }
        debug!(key = %self.key, count = next.len(), "persisted goals");
        self.goals = next;
        Ok(())
    }
}
