//! Trainer host binary.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  stdin ──▶ Console ──start/stop──▶ Producer thread        │
//! │                                      │ publish            │
//! │                                      ▼                    │
//! │                           SharedState ──▶ Decider         │
//! │                                      └──▶ Actuator ──▶ LogMotorDriver
//! │                                                           │  or SerialMotorLink
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tracing_subscriber::EnvFilter;

use trainer::adapters::LogMotorDriver;
use trainer::app::Trainer;
use trainer::config::TrainerConfig;
use trainer::drivers::SerialMotorLink;

const PKG_DESCRIPTION: &str = concat!(env!("CARGO_PKG_NAME"), " - robot trainer control loop");

#[derive(Debug, Parser)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = PKG_DESCRIPTION,
)]
struct Cli {
    /// Path to a JSON configuration file
    #[arg(long = "config", short = 'C', value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print the effective configuration and exit
    #[arg(long = "print-config")]
    print_config: bool,
    /// Override the producer tick interval (milliseconds)
    #[arg(long = "tick-ms")]
    tick_ms: Option<u64>,
    /// Send motor frames to this serial device instead of the log
    #[arg(long = "motor-port", value_name = "PATH")]
    motor_port: Option<PathBuf>,
}

fn resolve_config(cli: &Cli) -> Result<TrainerConfig> {
    let mut config = match &cli.config {
        Some(path) => TrainerConfig::load_from_path(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => TrainerConfig::default(),
    };
    if let Some(tick_ms) = cli.tick_ms {
        config.tick_interval_ms = tick_ms;
    }
    config.validate().context("validate config")?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!("Trainer v{}", env!("CARGO_PKG_VERSION"));

    let trainer = match &cli.motor_port {
        Some(path) => {
            let port = OpenOptions::new()
                .write(true)
                .open(path)
                .with_context(|| format!("open motor port {}", path.display()))?;
            info!("Motor link on {}", path.display());
            Trainer::with_reference_collaborators(&config, SerialMotorLink::new(port))?
        }
        None => Trainer::with_reference_collaborators(&config, LogMotorDriver::new())?,
    };

    info!("Type 'start' or 'stop'; EOF exits");
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    trainer.run_console(stdin.lock(), &mut stdout)?;

    trainer.shutdown();
    Ok(())
}
