#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Colony Fleet match over stdin and stdout.

mod config;
mod protocol;
mod session;

use std::{
    io,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colony_fleet_core::ThreatRange;
use colony_fleet_system_turn::TurnController;
use log::{error, info, LevelFilter};

/// Command-line arguments accepted by the engine binary.
#[derive(Debug, Parser)]
#[command(name = "colony-fleet", about = "Per-turn fleet decision engine")]
struct Args {
    /// Bot name announced to the match engine.
    #[arg(long, default_value = "colony-fleet")]
    name: String,

    /// File receiving the log output; stdout carries the engine protocol.
    #[arg(long, default_value = "colony-fleet.log")]
    log_file: PathBuf,

    /// Most verbose log level written to the log file.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// TOML file overriding the default tuning.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Threat threshold policy, overriding the tuning file.
    #[arg(long, value_enum)]
    threat_range: Option<ThreatRangeArg>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => Self::Off,
            LogLevel::Error => Self::Error,
            LogLevel::Warn => Self::Warn,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
            LogLevel::Trace => Self::Trace,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ThreatRangeArg {
    Squared,
    Linear,
}

impl From<ThreatRangeArg> for ThreatRange {
    fn from(range: ThreatRangeArg) -> Self {
        match range {
            ThreatRangeArg::Squared => Self::Squared,
            ThreatRangeArg::Linear => Self::Linear,
        }
    }
}

/// Entry point for the Colony Fleet command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.log_level.into(), &args.log_file)?;

    let mut tuning = config::load_tuning(args.config.as_deref())?;
    if let Some(range) = args.threat_range {
        tuning.threat_range = range.into();
    }
    info!("starting {} with {:?}", args.name, tuning);

    let mut controller = TurnController::new(tuning);
    let stdin = io::stdin();
    let stdout = io::stdout();
    match session::run(stdin.lock(), stdout.lock(), &args.name, &mut controller) {
        Ok(turns) => {
            info!("engine closed the match after {turns} turns");
            Ok(())
        }
        Err(failure) => {
            error!("match aborted: {failure:#}");
            Err(failure)
        }
    }
}

fn setup_logging(level: LevelFilter, path: &Path) -> Result<()> {
    let started = Instant::now();
    fern::Dispatch::new()
        .level(level)
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{:>9.3}s {:<5} {}] {}",
                started.elapsed().as_secs_f64(),
                record.level(),
                record.target(),
                message
            ))
        })
        .chain(
            fern::log_file(path)
                .with_context(|| format!("failed to open log file at {}", path.display()))?,
        )
        .apply()
        .context("logging was already initialised")?;
    Ok(())
}
