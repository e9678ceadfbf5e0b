//! carrel - study-room seat manager
//!
//! This is the main entry point for the carrel console.
//! It wires together:
//! - Configuration loading
//! - The reading room
//! - The console on stdin/stdout

use anyhow::{ensure, Context, Result};
use carrel::Console;
use carrel_config::{load_config, RoomPolicy, MAX_SEATS};
use carrel_core::ReadingRoom;
use carrel_util::{is_mock_time_active, SystemClock, MOCK_TIME_ENV_VAR};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// carrel - Study-room seat manager
#[derive(Parser, Debug)]
#[command(name = "carrel")]
#[command(about = "Study-room seat manager", long_about = None)]
struct Args {
    /// Configuration file path (built-in defaults if omitted)
    #[arg(short, long, env = "CARREL_CONFIG")]
    config: Option<PathBuf>,

    /// Number of seats, overriding the configuration
    #[arg(short, long)]
    seats: Option<usize>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn load_policy(args: &Args) -> Result<RoomPolicy> {
    let mut policy = match &args.config {
        Some(path) => {
            let policy = load_config(path)
                .with_context(|| format!("Failed to load config from {:?}", path))?;
            info!(config_path = %path.display(), "Configuration loaded");
            policy
        }
        None => RoomPolicy::default(),
    };

    if let Some(seats) = args.seats {
        ensure!(
            (1..=MAX_SEATS).contains(&seats),
            "--seats must be between 1 and {}, got {}",
            MAX_SEATS,
            seats
        );
        policy.seat_count = seats;
    }

    Ok(policy)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they never mix with the prompts
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "carrel starting");

    if is_mock_time_active() {
        warn!(
            env_var = MOCK_TIME_ENV_VAR,
            "Mock time is active, the clock is shifted"
        );
    }

    let policy = load_policy(&args)?;
    let room = ReadingRoom::new(policy);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(room, stdin.lock(), stdout.lock(), SystemClock);
    console.run().context("Console I/O failed")?;

    info!("carrel exiting");
    Ok(())
}
