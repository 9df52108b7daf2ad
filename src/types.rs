//! Core types for wellness state
//!
//! This module defines the persisted records (profile, goals), the derived
//! risk assessment, and the closed lookup tables that map open-ended labels
//! (goal category, activity level) onto known behavior with a default case.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Fallback color for unrecognized goal categories
pub const DEFAULT_CATEGORY_COLOR: &str = "#64748B";
/// Fallback unit for unrecognized goal categories
pub const DEFAULT_UNIT: &str = "units";

/// The single device-local user profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name
    pub name: String,
    /// Contact email (may be blank)
    pub email: String,
    /// Age as entered; consumers parse defensively
    pub age: String,
    /// Contact phone (may be blank)
    pub phone: String,
    /// Free-text gender label
    pub gender: String,
    /// Free-text activity level label, see [`ActivityLevel::from_label`]
    pub activity_level: String,
    /// Gates the onboarding flow
    pub completed_onboarding: bool,
    /// Last time the streak was evaluated (UTC)
    #[serde(deserialize_with = "lenient_timestamp")]
    pub last_active_date: Option<DateTime<Utc>>,
    /// Consecutive calendar days with recorded activity
    pub streak_count: u32,
}

impl UserProfile {
    /// Age used by derivations: the leading whole number of the stored text
    /// (`"40.5"` reads as 40), or 30 when there is none or it is 0
    pub fn age_or_default(&self) -> u32 {
        let age = self.age.trim_start();
        let digits = age.find(|c: char| !c.is_ascii_digit()).unwrap_or(age.len());
        age[..digits].parse::<u32>().ok().filter(|a| *a > 0).unwrap_or(30)
    }

    /// Normalized activity level, if the label is recognized
    pub fn activity(&self) -> Option<ActivityLevel> {
        ActivityLevel::from_label(&self.activity_level)
    }
}

/// Accepts RFC 3339 timestamps and the `Sat Oct 17 2026` date strings written
/// by older app builds. Anything else (including empty) becomes `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Parse a stored timestamp string; see [`UserProfile::last_active_date`]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // Legacy date-only form, pinned to LEGACY_DATE_HOUR_UTC
    NaiveDate::parse_from_str(raw, "%a %b %d %Y").ok().map(|d| {
        let time = NaiveTime::from_hms_opt(LEGACY_DATE_HOUR_UTC, 0, 0).unwrap_or_default();
        d.and_time(time).and_utc()
    })
}

/// UTC hour assigned to legacy date-only values.
///
/// 10:00 UTC falls on the same calendar date for every offset from UTC-10 to
/// UTC+13:59. Devices outside that range (UTC-11, UTC-12, UTC+14) see a legacy
/// date shifted by one day until the next activation rewrites it.
pub const LEGACY_DATE_HOUR_UTC: u32 = 10;

/// A tracked goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Unique, stable identifier
    pub id: String,
    /// Short title
    pub title: String,
    /// Optional free text
    #[serde(default)]
    pub description: String,
    /// Positive goal amount
    pub target: f64,
    /// Non-negative progress amount
    #[serde(default)]
    pub current: f64,
    /// Unit label paired with the category
    #[serde(default)]
    pub unit: String,
    /// Open category label, see [`GoalCategory`]
    #[serde(default)]
    pub category: String,
    /// Completion flag (progress-driven or manual)
    #[serde(default)]
    pub completed: bool,
    /// Creation time, immutable
    pub created_at: DateTime<Utc>,
    /// Integer percentage derived from `current / target`
    #[serde(default)]
    pub progress: u32,
}

impl Goal {
    /// Percentage progress for `current` against `target`, capped at 100
    pub fn progress_for(current: f64, target: f64) -> u32 {
        if target > 0.0 {
            ((current / target) * 100.0).round().clamp(0.0, 100.0) as u32
        } else {
            0
        }
    }

    /// Category lookup for this goal
    pub fn category_kind(&self) -> GoalCategory {
        GoalCategory::from_label(&self.category)
    }
}

/// Known goal categories with a fallback for anything else
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalCategory {
    Activity,
    Nutrition,
    Sleep,
    Wellness,
    Other(String),
}

impl GoalCategory {
    /// Map a stored label onto a category. `Mindfulness` is an older name for `Wellness`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Activity" => GoalCategory::Activity,
            "Nutrition" => GoalCategory::Nutrition,
            "Sleep" => GoalCategory::Sleep,
            "Wellness" | "Mindfulness" => GoalCategory::Wellness,
            other => GoalCategory::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            GoalCategory::Activity => "Activity",
            GoalCategory::Nutrition => "Nutrition",
            GoalCategory::Sleep => "Sleep",
            GoalCategory::Wellness => "Wellness",
            GoalCategory::Other(name) => name.as_str(),
        }
    }

    /// Display color (hex)
    pub fn color(&self) -> &'static str {
        match self {
            GoalCategory::Activity => "#10B981",
            GoalCategory::Nutrition => "#EAB308",
            GoalCategory::Sleep => "#06B6D4",
            GoalCategory::Wellness => "#EC4899",
            GoalCategory::Other(_) => DEFAULT_CATEGORY_COLOR,
        }
    }

    /// Unit suggested when a goal is created without one
    pub fn default_unit(&self) -> &'static str {
        match self {
            GoalCategory::Activity => "steps",
            GoalCategory::Nutrition => "calories",
            GoalCategory::Sleep => "hours",
            GoalCategory::Wellness => "sessions",
            GoalCategory::Other(_) => DEFAULT_UNIT,
        }
    }
}

/// Normalized activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// Match a stored label, case-sensitively, against the known spellings.
    ///
    /// Accepts both the short keys (`sedentary`, `veryActive`, ...) and the
    /// onboarding labels (`Lightly Active`, `Extremely Active`, ...).
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "sedentary" | "Sedentary" => Some(ActivityLevel::Sedentary),
            "light" | "Lightly Active" | "Light Active" => Some(ActivityLevel::Light),
            "moderate" | "Moderately Active" | "Moderate Active" => Some(ActivityLevel::Moderate),
            "active" | "Very Active" => Some(ActivityLevel::Active),
            "veryActive" | "very-active" | "Extremely Active" | "Super Active" => {
                Some(ActivityLevel::VeryActive)
            }
            _ => None,
        }
    }

    /// Percentage points added to activity-sensitive risks
    pub fn risk_modifier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 10.0,
            ActivityLevel::Light => 5.0,
            ActivityLevel::Moderate => 0.0,
            ActivityLevel::Active => -5.0,
            ActivityLevel::VeryActive => -8.0,
        }
    }
}

/// Inputs a risk category responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskFactor {
    Age,
    Activity,
    Goals,
}

/// Risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Bucket a risk percentage: <30 low, <70 medium, otherwise high
    pub fn from_risk(risk: u8) -> Self {
        if risk < 30 {
            RiskLevel::Low
        } else if risk < 70 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "#4CAF50",
            RiskLevel::Medium => "#FFC107",
            RiskLevel::High => "#F44336",
        }
    }
}

/// Derived risk for one category. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub category: String,
    /// Integer percentage in [1, 95]
    pub risk: u8,
    pub description: String,
    pub factors: Vec<RiskFactor>,
    pub level: RiskLevel,
    pub recommendations: Vec<String>,
}
