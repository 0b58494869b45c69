//! LiftTrack - Workout Log
//!
//! Command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lifttrack::actions::{self, ActionOutcome, Dashboard, EditPage, Rejection, WorkoutForm};
use lifttrack::storage::config::{
    get_config_path, load_config, load_config_from, save_config, save_config_to, AppConfig,
};
use lifttrack::workouts::calendar::today_in;
use lifttrack::{Database, UserId, Workout, WorkoutAccess};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log workouts and review them day by day
#[derive(Parser)]
#[command(name = "lifttrack")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (defaults to the platform data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the configuration
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Signed-in user
    #[arg(short, long, global = true, env = "LIFTTRACK_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Log a new workout
    New {
        /// Workout name
        #[arg(short, long)]
        name: Option<String>,

        /// Start time, RFC 3339 (e.g. 2024-03-01T09:00:00Z)
        #[arg(short, long)]
        started_at: String,
    },

    /// List workouts started on a day
    Day {
        /// Day to show as YYYY-MM-DD (defaults to today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Show one workout
    Show {
        /// Workout id
        workout_id: String,
    },

    /// Edit a workout
    Edit {
        /// Workout id
        workout_id: String,

        /// New workout name
        #[arg(short, long)]
        name: Option<String>,

        /// New start time, RFC 3339
        #[arg(short, long)]
        started_at: String,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Commands::Init { force } = &cli.command {
        return init_config(cli.config.as_deref(), *force);
    }

    let config = match &cli.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .context("Failed to load configuration")?;

    let day_offset = config.day_offset()?;
    let db_path = cli.database.clone().unwrap_or_else(|| config.database_path());
    let db = Database::open(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    let access = WorkoutAccess::new(&db, day_offset);

    let user = cli
        .user
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(UserId::new);
    let user = user.as_ref();

    match &cli.command {
        Commands::New { name, started_at } => {
            let form = WorkoutForm::new(name.as_deref(), started_at);
            match actions::create_workout(&access, user, &form)? {
                ActionOutcome::Success(workout) => {
                    print_workout(&workout, cli.json)?;
                    Ok(ExitCode::SUCCESS)
                }
                ActionOutcome::Rejected(rejection) => Ok(report_rejection(&rejection)),
            }
        }
        Commands::Day { date } => {
            let today = today_in(day_offset);
            match actions::load_dashboard(&access, user, date.as_deref(), today)? {
                ActionOutcome::Success(dashboard) => {
                    let total = match user {
                        Some(user) => access.count_workouts_for_user(user)?,
                        None => 0,
                    };
                    print_dashboard(&dashboard, total, cli.json)?;
                    Ok(ExitCode::SUCCESS)
                }
                ActionOutcome::Rejected(rejection) => Ok(report_rejection(&rejection)),
            }
        }
        Commands::Show { workout_id } => match actions::load_edit_page(&access, user, workout_id)? {
            EditPage::Found { workout, .. } => {
                print_workout(&workout, cli.json)?;
                Ok(ExitCode::SUCCESS)
            }
            EditPage::NotFound => {
                eprintln!("Workout {} not found", workout_id);
                Ok(ExitCode::FAILURE)
            }
            EditPage::Unauthorized => Ok(report_rejection(&Rejection::Unauthorized)),
        },
        Commands::Init { .. } => Ok(ExitCode::SUCCESS),
        Commands::Edit {
            workout_id,
            name,
            started_at,
        } => {
            let form = WorkoutForm::new(name.as_deref(), started_at);
            match actions::update_workout(&access, user, workout_id, &form)? {
                ActionOutcome::Success(true) => {
                    println!("Updated workout {}", workout_id);
                    Ok(ExitCode::SUCCESS)
                }
                ActionOutcome::Success(false) => {
                    eprintln!("Workout {} not found", workout_id);
                    Ok(ExitCode::FAILURE)
                }
                ActionOutcome::Rejected(rejection) => Ok(report_rejection(&rejection)),
            }
        }
    }
}

fn init_config(path: Option<&std::path::Path>, force: bool) -> Result<ExitCode> {
    let target = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    if target.exists() && !force {
        eprintln!(
            "Configuration already exists at {} (use --force to overwrite)",
            target.display()
        );
        return Ok(ExitCode::FAILURE);
    }

    let config = AppConfig::default();
    match path {
        Some(path) => save_config_to(&config, path),
        None => save_config(&config),
    }
    .with_context(|| format!("Failed to write configuration to {}", target.display()))?;

    tracing::info!(path = %target.display(), "Wrote default configuration");
    println!("{}", target.display());
    Ok(ExitCode::SUCCESS)
}

fn report_rejection(rejection: &Rejection) -> ExitCode {
    eprintln!("{}", rejection);
    if let Rejection::Invalid(errors) = rejection {
        for (field, messages) in &errors.field_errors {
            for message in messages {
                eprintln!("  {}: {}", field, message);
            }
        }
    }
    ExitCode::from(2)
}

fn print_workout(workout: &Workout, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(workout)?);
    } else {
        println!(
            "{}  {}  {}",
            workout.id,
            workout.started_at.format("%Y-%m-%d %H:%M"),
            workout.title()
        );
    }
    Ok(())
}

fn print_dashboard(dashboard: &Dashboard, total: usize, json: bool) -> Result<()> {
    if json {
        let body = serde_json::json!({
            "date": dashboard.date_param(),
            "workouts": dashboard.workouts,
            "total": total,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!(
        "Workouts logged on {} [{}] ({} of {} total)",
        dashboard.display_date(),
        dashboard.date_param(),
        dashboard.workouts.len(),
        total
    );
    if dashboard.workouts.is_empty() {
        println!("No workouts logged for {}.", dashboard.display_date());
    }
    for workout in &dashboard.workouts {
        print_workout(workout, false)?;
    }
    Ok(())
}
