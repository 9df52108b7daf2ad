//! Error types for wellness state

use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by store operations
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to serialize record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Field-level input validation failures.
///
/// These are raised at the input boundary, before any store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required")]
    TitleRequired,

    #[error("Title must be at most {max} characters")]
    TitleTooLong { max: usize },

    #[error("Description must be at most {max} characters")]
    DescriptionTooLong { max: usize },

    #[error("Target is required")]
    TargetRequired,

    #[error("Please enter a valid positive number")]
    TargetInvalid,

    #[error("Name is required")]
    NameRequired,

    #[error("Age is required")]
    AgeRequired,

    #[error("Please enter a valid age (1-120)")]
    AgeInvalid,

    #[error("Please select a gender")]
    GenderRequired,

    #[error("Please select an activity level")]
    ActivityLevelRequired,

    #[error("Please enter a valid phone number")]
    PhoneInvalid,

    #[error("Please enter a valid email address")]
    EmailInvalid,

    #[error("Goal id {id:?} appears more than once")]
    DuplicateGoalId { id: String },

    #[error("Please enter a valid workout duration")]
    DurationInvalid,

    #[error("Please enter times as HH:MM")]
    SleepTimeInvalid,

    #[error("Please enter a valid calorie amount.")]
    CaloriesInvalid,
}

impl ValidationError {
    /// Name of the input field this error belongs to
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::TitleRequired | ValidationError::TitleTooLong { .. } => "title",
            ValidationError::DescriptionTooLong { .. } => "description",
            ValidationError::TargetRequired | ValidationError::TargetInvalid => "target",
            ValidationError::NameRequired => "name",
            ValidationError::AgeRequired | ValidationError::AgeInvalid => "age",
            ValidationError::GenderRequired => "gender",
            ValidationError::ActivityLevelRequired => "activityLevel",
            ValidationError::PhoneInvalid => "phone",
            ValidationError::EmailInvalid => "email",
            ValidationError::DuplicateGoalId { .. } => "id",
            ValidationError::DurationInvalid => "duration",
            ValidationError::SleepTimeInvalid => "time",
            ValidationError::CaloriesInvalid => "calories",
        }
    }
}
