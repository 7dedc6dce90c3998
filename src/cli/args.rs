//! CLI argument definitions
//!
//! All Clap derive structs for `slotdraw` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Weighted prize drawing with a slot-machine reveal.
#[derive(Parser, Debug)]
#[command(name = "slotdraw", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "SLOTDRAW_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(
        long,
        default_value = "human",
        global = true,
        env = "SLOTDRAW_LOG_FORMAT"
    )]
    pub log_format: LogFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a draw with the animated reveal.
    Draw(DrawArgs),

    /// Inspect or clear recorded winners.
    Winners(WinnersCommand),

    /// Validate draw configuration files without drawing.
    Validate(ValidateArgs),
}

// ============================================================================
// Draw Command
// ============================================================================

/// Arguments for `draw`.
#[derive(Args, Debug)]
pub struct DrawArgs {
    /// Path to YAML draw configuration.
    #[arg(short, long, env = "SLOTDRAW_CONFIG")]
    pub config: PathBuf,

    /// Override the number of winners from the configuration.
    #[arg(short, long, allow_negative_numbers = true)]
    pub winners: Option<i64>,

    /// Seed for a reproducible draw (overrides the configuration).
    #[arg(long, env = "SLOTDRAW_SEED")]
    pub seed: Option<u64>,

    /// Append winners to this JSONL store.
    #[arg(long, env = "SLOTDRAW_STORE")]
    pub store: Option<PathBuf>,

    /// Write structured JSONL events to this file.
    #[arg(long, env = "SLOTDRAW_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Expose Prometheus metrics on this port.
    #[arg(long, env = "SLOTDRAW_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Replace the configured timing with a sub-second reveal (10 ms
    /// countdown ticks, 1-20 ms scroll, 10 ms settle).
    #[arg(long)]
    pub fast: bool,

    /// Output format for the winners list.
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Winners Command
// ============================================================================

/// Winner store commands.
#[derive(Args, Debug)]
pub struct WinnersCommand {
    /// Winners subcommand.
    #[command(subcommand)]
    pub subcommand: WinnersSubcommand,
}

/// Winner store subcommands.
#[derive(Subcommand, Debug)]
pub enum WinnersSubcommand {
    /// List recorded winners, most recent first.
    List(WinnersListArgs),

    /// Delete every recorded winner.
    Purge(WinnersPurgeArgs),
}

/// Arguments for `winners list`.
#[derive(Args, Debug)]
pub struct WinnersListArgs {
    /// Path to the JSONL winner store.
    #[arg(long, env = "SLOTDRAW_STORE")]
    pub store: PathBuf,

    /// Output format.
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `winners purge`.
#[derive(Args, Debug)]
pub struct WinnersPurgeArgs {
    /// Path to the JSONL winner store.
    #[arg(long, env = "SLOTDRAW_STORE")]
    pub store: PathBuf,

    /// Write structured JSONL events to this file.
    #[arg(long, env = "SLOTDRAW_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,
}

// ============================================================================
// Validate Command
// ============================================================================

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}
