//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod draw;
pub mod validate;
pub mod winners;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands, WinnersSubcommand};
use crate::error::SlotDrawError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// `cancel` fires when the process receives SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), SlotDrawError> {
    match cli.command {
        Commands::Draw(args) => draw::run(&args, cli.quiet, cancel).await,
        Commands::Winners(cmd) => match cmd.subcommand {
            WinnersSubcommand::List(args) => winners::list(&args).await,
            WinnersSubcommand::Purge(args) => winners::purge(&args).await,
        },
        Commands::Validate(args) => validate::run(&args),
    }
}
