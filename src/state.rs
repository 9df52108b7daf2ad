//! Application state facade
//!
//! One [`WellnessState`] is constructed at process start and handed to the
//! presentation layer. It owns the profile, goal and preference stores over a
//! shared key-value backend and exposes the derived views (risks, progress).

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use tracing::info;

use crate::config::StorageKeys;
use crate::error::StateError;
use crate::goals::GoalStore;
use crate::preferences::PreferenceStore;
use crate::profile::ProfileStore;
use crate::progress::ProgressSummary;
use crate::risk::compute_risks;
use crate::storage::KeyValueStore;
use crate::types::{Goal, RiskAssessment, UserProfile};

/// Profile, goals and preferences for the single local user
pub struct WellnessState {
    profiles: ProfileStore,
    goals: GoalStore,
    preferences: PreferenceStore,
}

impl WellnessState {
    /// Create state over `storage` using the default keys
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_keys(storage, &StorageKeys::default())
    }

    /// Create state over `storage` using custom keys
    pub fn with_keys(storage: Arc<dyn KeyValueStore>, keys: &StorageKeys) -> Self {
        Self {
            profiles: ProfileStore::new(Arc::clone(&storage), keys.profile.clone()),
            goals: GoalStore::new(Arc::clone(&storage), keys.goals.clone()),
            preferences: PreferenceStore::new(storage, keys),
        }
    }

    /// Load everything and record today's activity.
    ///
    /// Loads the profile, advances the streak if the profile exists, then
    /// loads (or seeds) the goal collection.
    pub async fn bootstrap<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Result<(), StateError> {
        if self.profiles.load().await?.is_some() {
            self.profiles.activate(now).await?;
        }
        self.goals.load(now.with_timezone(&Utc)).await?;
        info!(
            onboarded = !self.needs_onboarding(),
            goals = self.goals.goals().len(),
            "state loaded"
        );
        Ok(())
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profiles.profile()
    }

    pub fn goals(&self) -> &[Goal] {
        self.goals.goals()
    }

    pub fn profile_store(&mut self) -> &mut ProfileStore {
        &mut self.profiles
    }

    pub fn goal_store(&mut self) -> &mut GoalStore {
        &mut self.goals
    }

    pub fn preferences(&self) -> &PreferenceStore {
        &self.preferences
    }

    /// Whether the onboarding flow should be shown
    pub fn needs_onboarding(&self) -> bool {
        !self
            .profiles
            .profile()
            .is_some_and(|p| p.completed_onboarding)
    }

    /// Risk assessments for the current snapshot
    pub fn risks(&self) -> Vec<RiskAssessment> {
        compute_risks(self.profiles.profile(), self.goals.goals())
    }

    /// Progress overview for the current goals
    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary::from_goals(self.goals.goals())
    }

    /// Clear the profile and reset goals to the starter set
    pub async fn sign_out(&mut self, now: DateTime<Utc>) -> Result<(), StateError> {
        self.profiles.clear().await?;
        self.goals.reset_to_default(now).await?;
        info!("signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goals::{default_goals, GoalDraft};
    use crate::profile::OnboardingForm;
    use crate::storage::InMemoryKeyValueStore;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap()
    }

    fn form() -> OnboardingForm {
        OnboardingForm {
            name: "Sam".to_string(),
            age: "40".to_string(),
            gender: "Other".to_string(),
            activity_level: "sedentary".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fresh_install() {
        let kv = InMemoryKeyValueStore::new();
        let mut state = WellnessState::new(Arc::new(kv.clone()));

        state.bootstrap(&now()).await.unwrap();

        assert!(state.needs_onboarding());
        assert!(state.risks().is_empty());
        assert_eq!(state.goals(), default_goals(now()).as_slice());
        assert!(kv.get("goals").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_onboard_then_restart_advances_streak() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let mut state = WellnessState::new(kv.clone());
        state.bootstrap(&now()).await.unwrap();
        state.profile_store().complete_onboarding(form(), now()).await.unwrap();
        assert!(!state.needs_onboarding());

        let tomorrow = now() + Duration::days(1);
        let mut restarted = WellnessState::new(kv);
        restarted.bootstrap(&tomorrow).await.unwrap();

        let profile = restarted.profile().unwrap();
        assert_eq!(profile.streak_count, 2);
        assert_eq!(profile.last_active_date, Some(tomorrow));
    }

    #[tokio::test]
    async fn test_risks_follow_goal_changes() {
        let mut state = WellnessState::new(Arc::new(InMemoryKeyValueStore::new()));
        state.bootstrap(&now()).await.unwrap();
        state.profile_store().complete_onboarding(form(), now()).await.unwrap();

        // 15 + 2.5 + 10 - 10 -> 18 with no goals complete
        assert_eq!(state.risks()[0].risk, 18);

        for id in ["1", "2", "3"] {
            state.goal_store().complete(id).await.unwrap();
        }
        // All goals complete: no goals adjustment
        assert_eq!(state.risks()[0].risk, 28);
        assert_eq!(state.summary().completion_rate, 100);
    }

    #[tokio::test]
    async fn test_sign_out_clears_profile_and_resets_goals() {
        let kv = InMemoryKeyValueStore::new();
        let mut state = WellnessState::new(Arc::new(kv.clone()));
        state.bootstrap(&now()).await.unwrap();
        state.profile_store().complete_onboarding(form(), now()).await.unwrap();
        state
            .goal_store()
            .add(
                GoalDraft {
                    title: "Meditate".to_string(),
                    category: "Wellness".to_string(),
                    target: "10".to_string(),
                    ..Default::default()
                },
                now(),
            )
            .await
            .unwrap();
        state.goal_store().toggle_complete("1").await.unwrap();

        let later = now() + Duration::hours(2);
        state.sign_out(later).await.unwrap();

        assert!(state.profile().is_none());
        assert!(state.needs_onboarding());
        assert_eq!(state.goals(), default_goals(later).as_slice());
        assert_eq!(kv.get("userDetails").await.unwrap(), None);

        let mut restarted = WellnessState::new(Arc::new(kv));
        restarted.bootstrap(&later).await.unwrap();
        assert!(restarted.profile().is_none());
        assert_eq!(restarted.goals(), default_goals(later).as_slice());
    }

    #[tokio::test]
    async fn test_custom_keys() {
        let kv = InMemoryKeyValueStore::new();
        let keys = StorageKeys {
            goals: "goals_v2".to_string(),
            ..Default::default()
        };
        let mut state = WellnessState::with_keys(Arc::new(kv.clone()), &keys);
        state.bootstrap(&now()).await.unwrap();

        assert!(kv.get("goals_v2").await.unwrap().is_some());
        assert!(kv.get("goals").await.unwrap().is_none());
    }
}
