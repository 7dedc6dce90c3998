//! Diagnostic logging for `slotdraw`.
//!
//! Everything goes to stderr: stdout carries the winners list and the
//! reveal frames are drawn on stderr between log lines. `-v` flags raise
//! the level of `slotdraw`'s own targets first and of dependencies one step
//! behind, so `-vv` shows reveal ticks without tokio internals.

use std::io::IsTerminal;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::cli::args::ColorChoice;

/// Environment variable holding a full filter, e.g. `slotdraw::store=trace`.
pub const LOG_LEVEL_ENV: &str = "SLOTDRAW_LOG_LEVEL";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Plain text, colored on a terminal.
    #[default]
    Human,
    /// One JSON object per line with event fields flattened.
    Json,
}

/// Filter directive for a `-v` count.
#[must_use]
pub const fn directive_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,slotdraw=info",
        2 => "info,slotdraw=debug",
        _ => "debug,slotdraw=trace",
    }
}

/// Whether log lines should carry ANSI escapes.
///
/// `Auto` colors only when stderr is a terminal and `NO_COLOR` is unset.
#[must_use]
pub fn ansi_enabled(color: ColorChoice, stderr_is_tty: bool, no_color: bool) -> bool {
    match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => stderr_is_tty && !no_color,
    }
}

/// Installs the global subscriber.
///
/// A parseable [`LOG_LEVEL_ENV`] replaces the `-v` directive. Installing
/// twice is a no-op.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(directive_for(verbosity)));

    let output = match format {
        LogFormat::Human => fmt::layer()
            .with_ansi(ansi_enabled(
                color,
                std::io::stderr().is_terminal(),
                std::env::var_os("NO_COLOR").is_some(),
            ))
            .with_target(verbosity >= 2)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init();
}
