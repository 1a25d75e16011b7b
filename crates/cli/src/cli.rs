//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Tracker - identity-aware analytics and attribution session runner
#[derive(Parser, Debug)]
#[command(
    name = "tracker",
    author,
    version,
    about = "Identity-aware analytics fan-out and install attribution",
    long_about = "Replays scripted app sessions against configured analytics sinks.\n\n\
                  Each event is fanned out to every sink concurrently, tagged with the \n\
                  hashed identity when a user is signed in, and reported per sink."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TRACKER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TRACKER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a scripted session against the configured sinks
    Replay(ReplayArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),

    /// Print the hashed identity for an email
    Hash(HashArgs),
}

/// Arguments for the `replay` command
#[derive(Parser, Debug, Clone)]
pub struct ReplayArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "tracker.toml", env = "TRACKER_CONFIG")]
    pub config: PathBuf,

    /// Session script, one JSON action per line
    #[arg(short, long, env = "TRACKER_SCRIPT")]
    pub script: PathBuf,

    /// Persist launch/sign-up flags to this file (in-memory if omitted)
    #[arg(long, env = "TRACKER_STATE")]
    pub state: Option<PathBuf>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "TRACKER_METRICS_PORT")]
    pub metrics_port: u16,

    /// Print each dispatch report as a JSON line
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "tracker.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "tracker.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `hash` command
#[derive(Parser, Debug)]
pub struct HashArgs {
    /// Email address to hash
    pub email: String,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
