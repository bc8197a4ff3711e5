//! CLI definitions.

pub mod app;
pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coral")]
#[command(author, version, about = "Classifier-driven crypto spot trading bot")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    pub log_level: LogLevel,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the scheduler loop: guard and trade cycles on their cadences
    Run(RunArgs),
    /// Execute a single trade cycle and exit
    Trade,
    /// Execute a single guard cycle and exit
    Guard,
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Override the guard cycle cadence in minutes
    #[arg(long)]
    pub guard_minutes: Option<u64>,

    /// Override the trade cycle cadence in minutes
    #[arg(long)]
    pub trade_minutes: Option<u64>,
}
