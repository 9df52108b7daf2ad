//! Wellness CLI - Command-line interface for Wellness State
//!
//! Commands:
//! - onboard: Create the local profile
//! - profile / goals / prefs: Inspect and edit stored state
//! - goals log-workout / log-sleep / log-meal: Quick-log activity onto matching goals
//! - risks / summary / streak: Print derived views
//! - sign-out: Clear the profile and reset goals
//! - doctor: Diagnose the data directory and stored records

use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use wellness_state::config::DEFAULT_DATA_DIR;
use wellness_state::goals::GoalDraft;
use wellness_state::types::Goal;
use wellness_state::{
    FileKeyValueStore, KeyValueStore, OnboardingForm, ProfileUpdate, StateConfig, StateError,
    WellnessState, VERSION,
};

/// Wellness - On-device profile, goal and risk state
#[derive(Parser)]
#[command(name = "wellness")]
#[command(version = VERSION)]
#[command(about = "Manage local wellness profile, goals and streaks", long_about = None)]
struct Cli {
    /// Directory holding the stored records
    #[arg(long, global = true, env = "WELLNESS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// JSON configuration file (data directory and storage keys)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the profile from onboarding answers
    Onboard {
        #[arg(long)]
        name: String,

        /// Age in years (1-120)
        #[arg(long)]
        age: String,

        #[arg(long)]
        gender: String,

        /// Activity level label, e.g. "sedentary" or "Very Active"
        #[arg(long)]
        activity_level: String,

        /// Contact email; derived from the name when omitted
        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        phone: String,
    },

    /// Show or edit the profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Manage goals
    Goals {
        #[command(subcommand)]
        command: GoalsCommand,
    },

    /// Print risk assessments
    Risks,

    /// Print goal progress summary
    Summary,

    /// Record activity now and print the streak
    Streak,

    /// Show or change preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },

    /// Clear the profile and reset goals to the starter set
    SignOut,

    /// Diagnose the data directory and stored records
    Doctor,
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Print the stored profile
    Show,

    /// Edit profile fields; omitted fields are unchanged
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        activity_level: Option<String>,
    },
}

#[derive(Subcommand)]
enum GoalsCommand {
    /// List all goals
    List,

    /// Add a goal
    Add {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Activity, Nutrition, Sleep, Wellness or any custom label
        #[arg(long, default_value = "Activity")]
        category: String,

        /// Positive target value
        #[arg(long)]
        target: String,

        /// Unit label; the category default when omitted
        #[arg(long)]
        unit: Option<String>,
    },

    /// Mark a goal completed
    Complete { id: String },

    /// Flip a goal's completed flag
    Toggle { id: String },

    /// Set a goal's current value
    Progress { id: String, current: f64 },

    /// Remove a goal
    Remove { id: String },

    /// Replace a goal with one read from a JSON file (use - for stdin)
    Swap { id: String, input: PathBuf },

    /// Reset goals to the starter set
    Reset,

    /// Replace the whole collection with a JSON array file (use - for stdin)
    Import { input: PathBuf },

    /// Add workout minutes to exercise goals
    LogWorkout {
        #[arg(long)]
        minutes: u32,
    },

    /// Record last night's sleep on sleep goals
    LogSleep {
        /// Bedtime as HH:MM
        #[arg(long, default_value = "22:00")]
        bedtime: String,

        /// Wake time as HH:MM; earlier than bedtime means the next day
        #[arg(long, default_value = "07:00")]
        wake: String,
    },

    /// Add a meal's calories to nutrition goals
    LogMeal {
        #[arg(long, allow_hyphen_values = true)]
        calories: i64,
    },
}

#[derive(Subcommand)]
enum PrefsCommand {
    /// Print preference flags
    Show,

    /// Change preference flags
    Set {
        #[arg(long)]
        notifications: Option<bool>,
        #[arg(long)]
        dark_mode: Option<bool>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let error = CliError::from(e);
            eprintln!(
                "{}",
                serde_json::to_string(&error).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), WellnessCliError> {
    let config = load_config(cli.config.as_deref(), cli.data_dir)?;
    let pretty = cli.pretty;

    let storage: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&config.data_dir));
    let mut state = WellnessState::with_keys(storage, &config.keys);
    let now = Local::now();
    // Doctor inspects the records as they are, without seeding or activating
    if !matches!(cli.command, Commands::Doctor) {
        state.bootstrap(&now).await?;
    }
    let now = now.with_timezone(&Utc);

    match cli.command {
        Commands::Onboard {
            name,
            age,
            gender,
            activity_level,
            email,
            phone,
        } => {
            let form = OnboardingForm {
                name,
                age,
                gender,
                activity_level,
                email,
                phone,
            };
            let profile = state.profile_store().complete_onboarding(form, now).await?;
            emit(&profile, pretty)
        }

        Commands::Profile { command } => match command {
            ProfileCommand::Show => emit(&state.profile(), pretty),
            ProfileCommand::Update {
                name,
                email,
                phone,
                age,
                gender,
                activity_level,
            } => {
                let update = ProfileUpdate {
                    name,
                    email,
                    phone,
                    age,
                    gender,
                    activity_level,
                };
                let profile = state
                    .profile_store()
                    .update(update)
                    .await?
                    .ok_or(WellnessCliError::NoProfile)?;
                emit(profile, pretty)
            }
        },

        Commands::Goals { command } => cmd_goals(&mut state, command, now, pretty).await,

        Commands::Risks => emit(&state.risks(), pretty),

        Commands::Summary => emit(&state.summary(), pretty),

        Commands::Streak => {
            let profile = state.profile().ok_or(WellnessCliError::NoProfile)?;
            emit(
                &serde_json::json!({
                    "streakCount": profile.streak_count,
                    "lastActiveDate": profile.last_active_date,
                }),
                pretty,
            )
        }

        Commands::Prefs { command } => {
            let prefs = state.preferences();
            if let PrefsCommand::Set {
                notifications,
                dark_mode,
            } = command
            {
                if let Some(enabled) = notifications {
                    prefs.set_notifications(enabled).await?;
                }
                if let Some(enabled) = dark_mode {
                    prefs.set_dark_mode(enabled).await?;
                }
            }
            emit(&prefs.load().await?, pretty)
        }

        Commands::SignOut => {
            state.sign_out(now).await?;
            emit(&serde_json::json!({ "signedOut": true }), pretty)
        }

        Commands::Doctor => cmd_doctor(&config, pretty).await,
    }
}

async fn cmd_goals(
    state: &mut WellnessState,
    command: GoalsCommand,
    now: chrono::DateTime<Utc>,
    pretty: bool,
) -> Result<(), WellnessCliError> {
    let store = state.goal_store();
    let changed = match command {
        GoalsCommand::List => return emit(&store.goals(), pretty),
        GoalsCommand::Add {
            title,
            description,
            category,
            target,
            unit,
        } => {
            let draft = GoalDraft {
                title,
                description,
                category,
                target,
                unit,
            };
            let goal = store.add(draft, now).await?;
            return emit(&goal, pretty);
        }
        GoalsCommand::Complete { id } => {
            let found = store.complete(&id).await?;
            require_goal(found, id)?
        }
        GoalsCommand::Toggle { id } => {
            let found = store.toggle_complete(&id).await?;
            require_goal(found, id)?
        }
        GoalsCommand::Progress { id, current } => {
            let found = store.update_current(&id, current).await?;
            require_goal(found, id)?
        }
        GoalsCommand::Remove { id } => {
            let found = store.remove(&id).await?;
            let id = require_goal(found, id)?;
            return emit(&serde_json::json!({ "removed": id }), pretty);
        }
        // The replacement takes over the existing id
        GoalsCommand::Swap { id, input } => {
            let goal: Goal = serde_json::from_str(&read_input(&input)?)?;
            let found = store.swap(&id, goal).await?;
            require_goal(found, id)?
        }
        GoalsCommand::Reset => {
            store.reset_to_default(now).await?;
            return emit(&store.goals(), pretty);
        }
        GoalsCommand::Import { input } => {
            let goals: Vec<Goal> = serde_json::from_str(&read_input(&input)?)?;
            store.replace_all(goals).await?;
            return emit(&store.goals(), pretty);
        }
        GoalsCommand::LogWorkout { minutes } => {
            let updated = store.log_workout(minutes).await?;
            return emit_logged(updated, store.goals(), pretty);
        }
        GoalsCommand::LogSleep { bedtime, wake } => {
            let updated = store.log_sleep(&bedtime, &wake).await?;
            return emit_logged(updated, store.goals(), pretty);
        }
        GoalsCommand::LogMeal { calories } => {
            let updated = store.log_meal(calories).await?;
            return emit_logged(updated, store.goals(), pretty);
        }
    };
    emit(&store.get(&changed), pretty)
}

fn emit_logged(updated: usize, goals: &[Goal], pretty: bool) -> Result<(), WellnessCliError> {
    emit(&serde_json::json!({ "updated": updated, "goals": goals }), pretty)
}

/// Turn a not-found mutation into an error, passing the id through otherwise
fn require_goal(found: bool, id: String) -> Result<String, WellnessCliError> {
    if found {
        Ok(id)
    } else {
        Err(WellnessCliError::GoalNotFound(id))
    }
}

fn load_config(
    path: Option<&Path>,
    data_dir: Option<PathBuf>,
) -> Result<StateConfig, WellnessCliError> {
    let mut config = match path {
        Some(path) => StateConfig::from_json(&fs::read_to_string(path)?)?,
        None => StateConfig::default(),
    };
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    Ok(config)
}

fn read_input(input: &Path) -> Result<String, WellnessCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn emit<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<(), WellnessCliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

async fn cmd_doctor(config: &StateConfig, pretty: bool) -> Result<(), WellnessCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Wellness State version {}", VERSION),
    });

    let data_dir = &config.data_dir;
    checks.push(if data_dir.is_dir() {
        DoctorCheck {
            name: "data_dir".to_string(),
            status: CheckStatus::Ok,
            message: format!("Data directory {}", data_dir.display()),
        }
    } else {
        DoctorCheck {
            name: "data_dir".to_string(),
            status: CheckStatus::Warning,
            message: format!(
                "Data directory {} does not exist yet (default {})",
                data_dir.display(),
                DEFAULT_DATA_DIR
            ),
        }
    });

    let storage = FileKeyValueStore::new(data_dir);
    let keys = [
        ("profile", &config.keys.profile),
        ("goals", &config.keys.goals),
        ("notifications", &config.keys.notifications),
        ("dark_mode", &config.keys.dark_mode),
    ];
    for (name, key) in keys {
        let check = match storage.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(_) => DoctorCheck {
                    name: name.to_string(),
                    status: CheckStatus::Ok,
                    message: format!("'{}' is valid JSON", key),
                },
                Err(e) => DoctorCheck {
                    name: name.to_string(),
                    status: CheckStatus::Warning,
                    message: format!("'{}' is malformed and will be ignored: {}", key, e),
                },
            },
            Ok(None) => DoctorCheck {
                name: name.to_string(),
                status: CheckStatus::Ok,
                message: format!("'{}' not stored", key),
            },
            Err(e) => DoctorCheck {
                name: name.to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read '{}': {}", key, e),
            },
        };
        checks.push(check);
    }

    checks.push(DoctorCheck {
        name: "stdin".to_string(),
        status: CheckStatus::Ok,
        message: if atty::is(atty::Stream::Stdin) {
            "stdin is a TTY (use a file path for swap/import)".to_string()
        } else {
            "stdin is a pipe (swap/import accept -)".to_string()
        },
    });

    let report = DoctorReport {
        version: VERSION.to_string(),
        checks,
    };
    emit(&report, pretty)?;

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(WellnessCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum WellnessCliError {
    Io(io::Error),
    State(StateError),
    Json(serde_json::Error),
    NoProfile,
    GoalNotFound(String),
    DoctorFailed,
}

impl From<io::Error> for WellnessCliError {
    fn from(e: io::Error) -> Self {
        WellnessCliError::Io(e)
    }
}

impl From<StateError> for WellnessCliError {
    fn from(e: StateError) -> Self {
        WellnessCliError::State(e)
    }
}

impl From<serde_json::Error> for WellnessCliError {
    fn from(e: serde_json::Error) -> Self {
        WellnessCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<WellnessCliError> for CliError {
    fn from(e: WellnessCliError) -> Self {
        match e {
            WellnessCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            WellnessCliError::State(StateError::Validation(e)) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Fix the '{}' field and retry", e.field())),
            },
            WellnessCliError::State(StateError::Storage(e)) => CliError {
                code: "STORAGE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'wellness doctor' to check the data directory".to_string()),
            },
            WellnessCliError::State(StateError::Json(e)) | WellnessCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            WellnessCliError::NoProfile => CliError {
                code: "NO_PROFILE".to_string(),
                message: "No profile is stored".to_string(),
                hint: Some("Run 'wellness onboard' first".to_string()),
            },
            WellnessCliError::GoalNotFound(id) => CliError {
                code: "GOAL_NOT_FOUND".to_string(),
                message: format!("No goal with id '{}'", id),
                hint: Some("Run 'wellness goals list' to see goal ids".to_string()),
            },
            WellnessCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct DoctorReport {
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
