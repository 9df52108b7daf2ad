//! Wellness State - On-device profile, goal, streak and risk state
//!
//! The crate holds the client-side state of a personal wellness app and the
//! derivations computed from it:
//! profile and goal stores over an async key-value backend → daily streak
//! policy → health risk heuristics and progress summaries.
//!
//! ## Modules
//!
//! - **Stores**: [`profile::ProfileStore`], [`goals::GoalStore`], [`preferences::PreferenceStore`]
//! - **Derivations**: [`streak::next_streak`], [`risk::compute_risks`],
//!   [`progress::ProgressSummary`], quick logs on [`goals::GoalStore`]
//! - **Facade**: [`state::WellnessState`], constructed once and passed to the UI layer

pub mod config;
pub mod error;
pub mod goals;
pub mod preferences;
pub mod profile;
pub mod progress;
pub mod risk;
pub mod state;
pub mod storage;
pub mod streak;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::{StateConfig, StorageKeys};
pub use error::{StateError, ValidationError};
pub use goals::{GoalDraft, GoalStore};
pub use profile::{OnboardingForm, ProfileStore, ProfileUpdate};
pub use risk::compute_risks;
pub use state::WellnessState;
pub use storage::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, StorageError};
pub use streak::{next_streak, StreakUpdate};
pub use types::{Goal, RiskAssessment, RiskLevel, UserProfile};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
