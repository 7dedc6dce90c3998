//! `slotdraw` - Weighted prize drawing with a slot-machine reveal

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use clap::Parser;
use tokio_util::sync::CancellationToken;

use slotdraw::cli::args::Cli;
use slotdraw::cli::commands;
use slotdraw::error::{ExitCode, SlotDrawError};
use slotdraw::observability::init_logging;

#[tokio::main]
async fn main() {
    let cli = parse_args();

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    let cancel = CancellationToken::new();
    let signal_code = Arc::new(AtomicI32::new(ExitCode::INTERRUPTED));

    // First signal cancels the running command, a second one exits immediately
    {
        let cancel = cancel.clone();
        let signal_code = Arc::clone(&signal_code);
        tokio::spawn(async move {
            let code = wait_for_signal().await;
            signal_code.store(code, Ordering::SeqCst);
            eprintln!("\nStopping... (press Ctrl+C again to force)");
            cancel.cancel();

            std::process::exit(wait_for_signal().await);
        });
    }

    let result = commands::dispatch(cli, cancel).await;

    match result {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(SlotDrawError::Cancelled) => {
            std::process::exit(signal_code.load(Ordering::SeqCst));
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

/// Parses the command line. Argument errors exit with [`ExitCode::USAGE_ERROR`];
/// `--help` and `--version` exit 0 as usual.
fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(ExitCode::USAGE_ERROR);
        }
        Err(e) => e.exit(),
    }
}

/// Waits for SIGINT or SIGTERM and returns the matching exit code.
#[cfg(unix)]
async fn wait_for_signal() -> i32 {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => ExitCode::INTERRUPTED,
                _ = sigterm.recv() => ExitCode::TERMINATED,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to register SIGTERM handler");
            wait_for_ctrl_c().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> i32 {
    wait_for_ctrl_c().await
}

async fn wait_for_ctrl_c() -> i32 {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    ExitCode::INTERRUPTED
}
