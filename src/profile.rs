//! Profile store
//!
//! Holds the single device-local profile. Every mutation is written to the
//! key-value store before the in-memory copy changes, so a failed write leaves
//! both sides as they were.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::error::{StateError, ValidationError};
use crate::storage::KeyValueStore;
use crate::streak::next_streak;
use crate::types::UserProfile;

/// Answers collected by the onboarding flow
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnboardingForm {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub activity_level: String,
    /// Optional; derived from the name when blank
    pub email: String,
    /// Optional
    pub phone: String,
}

impl OnboardingForm {
    /// Validate every field and build a fresh profile that has completed onboarding
    pub fn into_profile(self, now: DateTime<Utc>) -> Result<UserProfile, ValidationError> {
        let name = validate_name(&self.name)?;
        let age = validate_age(&self.age)?;
        let gender = required(&self.gender, ValidationError::GenderRequired)?;
        let activity_level =
            required(&self.activity_level, ValidationError::ActivityLevelRequired)?;
        let phone = validate_phone(&self.phone)?;
        let email = match self.email.trim() {
            "" => placeholder_email(&name),
            email => validate_email(email)?,
        };

        Ok(UserProfile {
            name,
            email,
            age,
            phone,
            gender,
            activity_level,
            completed_onboarding: true,
            last_active_date: Some(now),
            streak_count: 1,
        })
    }
}

/// Partial profile edit; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub activity_level: Option<String>,
}

impl ProfileUpdate {
    /// Apply this edit on top of `profile`, validating each supplied field
    pub fn apply_to(self, profile: &UserProfile) -> Result<UserProfile, ValidationError> {
        let mut next = profile.clone();
        if let Some(name) = self.name {
            next.name = validate_name(&name)?;
        }
        if let Some(email) = self.email {
            next.email = match email.trim() {
                "" => String::new(),
                email => validate_email(email)?,
            };
        }
        if let Some(phone) = self.phone {
            next.phone = validate_phone(&phone)?;
        }
        if let Some(age) = self.age {
            next.age = validate_age(&age)?;
        }
        if let Some(gender) = self.gender {
            next.gender = required(&gender, ValidationError::GenderRequired)?;
        }
        if let Some(activity_level) = self.activity_level {
            next.activity_level =
                required(&activity_level, ValidationError::ActivityLevelRequired)?;
        }
        Ok(next)
    }
}

fn required(value: &str, missing: ValidationError) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(missing)
    } else {
        Ok(value.to_string())
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    required(name, ValidationError::NameRequired)
}

/// Whole years only, 1 to 120
fn validate_age(age: &str) -> Result<String, ValidationError> {
    let age = required(age, ValidationError::AgeRequired)?;
    if !age.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::AgeInvalid);
    }
    match age.parse::<u32>() {
        Ok(n) if (1..=120).contains(&n) => Ok(age),
        _ => Err(ValidationError::AgeInvalid),
    }
}

/// 7 to 15 digits, optional leading `+`, spaces and dashes ignored. Blank is allowed.
fn validate_phone(phone: &str) -> Result<String, ValidationError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Ok(String::new());
    }
    let body = phone.strip_prefix('+').unwrap_or(phone);
    let mut digits = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' => {}
            _ => return Err(ValidationError::PhoneInvalid),
        }
    }
    if (7..=15).contains(&digits) {
        Ok(phone.to_string())
    } else {
        Err(ValidationError::PhoneInvalid)
    }
}

fn validate_email(email: &str) -> Result<String, ValidationError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email.to_string())
    } else {
        Err(ValidationError::EmailInvalid)
    }
}

/// `Jane Q Doe` becomes `jane.q.doe@example.com`
fn placeholder_email(name: &str) -> String {
    let local = name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(".");
    format!("{local}@example.com")
}

/// Write-through holder of the current profile
pub struct ProfileStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    current: Option<UserProfile>,
}

impl ProfileStore {
    /// Create a store persisting under `key`. Call [`ProfileStore::load`] before use.
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            current: None,
        }
    }

    /// Current in-memory profile
    pub fn profile(&self) -> Option<&UserProfile> {
        self.current.as_ref()
    }

    /// Load the profile. Absent or malformed data yields `None`; only a
    /// failing read is reported as an error.
    pub async fn load(&mut self) -> Result<Option<&UserProfile>, StateError> {
        let stored = self.storage.get(&self.key).await?;

        self.current = stored.and_then(|raw| {
            match serde_json::from_str::<Option<UserProfile>>(&raw) {
                Ok(profile) => profile,
                Err(e) => {
                    warn!(key = %self.key, error = %e, "discarding malformed profile");
                    None
                }
            }
        });
        Ok(self.current.as_ref())
    }

    /// Persist `profile` in full, replacing whatever was stored
    pub async fn save(&mut self, profile: UserProfile) -> Result<(), StateError> {
        let json = serde_json::to_string(&profile)?;
        if let Err(e) = self.storage.set(&self.key, &json).await {
            error!(key = %self.key, error = %e, "failed to persist profile");
            return Err(e.into());
        }
        debug!(key = %self.key, "persisted profile");
        self.current = Some(profile);
        Ok(())
    }

    /// Remove the stored profile
    pub async fn clear(&mut self) -> Result<(), StateError> {
        if let Err(e) = self.storage.remove(&self.key).await {
            error!(key = %self.key, error = %e, "failed to clear profile");
            return Err(e.into());
        }
        debug!(key = %self.key, "cleared profile");
        self.current = None;
        Ok(())
    }

    /// Validate onboarding answers and save the resulting profile
    pub async fn complete_onboarding(
        &mut self,
        form: OnboardingForm,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, StateError> {
        let profile = form.into_profile(now)?;
        self.save(profile.clone()).await?;
        Ok(profile)
    }

    /// Apply a profile edit. Returns `None` when there is no profile to edit.
    pub async fn update(
        &mut self,
        update: ProfileUpdate,
    ) -> Result<Option<&UserProfile>, StateError> {
        let Some(current) = self.current.as_ref() else {
            return Ok(None);
        };
        let next = update.apply_to(current)?;
        self.save(next).await?;
        Ok(self.current.as_ref())
    }

    /// Evaluate the streak policy at `now` and persist any change.
    ///
    /// Repeated calls on the same calendar day are no-ops. Returns the
    /// resulting profile, or `None` when no profile is loaded.
    pub async fn activate<Tz: TimeZone>(
        &mut self,
        now: &DateTime<Tz>,
    ) -> Result<Option<&UserProfile>, StateError> {
        let Some(current) = self.current.as_ref() else {
            return Ok(None);
        };

        let update = next_streak(current.last_active_date, current.streak_count, now);
        if update.new_streak == current.streak_count
            && Some(update.new_last_active) == current.last_active_date
        {
            return Ok(self.current.as_ref());
        }

        debug!(
            from = current.streak_count,
            to = update.new_streak,
            "streak updated"
        );
        let next = UserProfile {
            streak_count: update.new_streak,
            last_active_date: Some(update.new_last_active),
            ..current.clone()
        };
        self.save(next).await?;
        Ok(self.current.as_ref())
    }
}
