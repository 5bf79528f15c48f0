//! Yatra CLI entry point

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info};

use yatra::cli::{Cli, Command, OutputFormat};
use yatra::config::Config;
use yatra::planner::create_client;
use yatra::store::{SqliteStore, TripStore};
use yatra::tui;

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    // The TUI owns the terminal, so logs always go to a file.
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("yatra")
        .join("logs");
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let level = match cli_log_level.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("yatra.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::History { format }) => cmd_history(&config, format),
        None => cmd_plan(&config).await,
    }
}

/// Launch the interactive planner
async fn cmd_plan(config: &Config) -> Result<()> {
    config.validate()?;

    let planner = create_client(&config.planner)?;
    let store: Arc<dyn TripStore> =
        Arc::new(SqliteStore::open(config.storage.expanded_db_path()).context("Failed to open trip history")?);

    tui::run(config, planner, store).await
}

/// Print saved trips without entering the planner
fn cmd_history(config: &Config, format: OutputFormat) -> Result<()> {
    let store = SqliteStore::open(config.storage.expanded_db_path()).context("Failed to open trip history")?;
    let identity = store
        .sign_in()?
        .ok_or_else(|| eyre::eyre!("Sign-in was cancelled"))?;
    let trips = store.list_trips(&identity.user_id)?;

    match format {
        OutputFormat::Json => {
            let plans: Vec<_> = trips.iter().map(|t| &t.plan).collect();
            println!("{}", serde_json::to_string_pretty(&plans)?);
        }
        OutputFormat::Text => {
            if trips.is_empty() {
                println!("No saved trips.");
            }
            for trip in &trips {
                println!(
                    "{}  {} ({} days, saved {})",
                    trip.id,
                    trip.plan.title,
                    trip.plan.total_duration,
                    trip.saved_at.format("%Y-%m-%d %H:%M"),
                );
            }
        }
    }
    Ok(())
}
