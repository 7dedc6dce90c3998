//! `slotdraw winners`: inspect or clear the winner store.

use std::fmt::Write as _;

use chrono::Utc;
use tracing::{error, info};

use crate::cli::args::{OutputFormat, WinnersListArgs, WinnersPurgeArgs};
use crate::error::SlotDrawError;
use crate::observability::events::{Event, EventEmitter};
use crate::observability::metrics;
use crate::store::{JsonlWinnerStore, Winner, WinnerStore};

/// Runs `slotdraw winners list`.
///
/// # Errors
///
/// Returns [`SlotDrawError::Store`] if the store cannot be read.
pub async fn list(args: &WinnersListArgs) -> Result<(), SlotDrawError> {
    let store = JsonlWinnerStore::new(&args.store);
    let winners = store
        .fetch_all()
        .await
        .inspect_err(|_| metrics::record_store_error("fetch"))?;
    print!("{}", format_winners(&winners, args.format)?);
    Ok(())
}

/// Runs `slotdraw winners purge`.
///
/// # Errors
///
/// Returns [`SlotDrawError::Store`] if the store cannot be purged.
pub async fn purge(args: &WinnersPurgeArgs) -> Result<(), SlotDrawError> {
    let store = JsonlWinnerStore::new(&args.store);
    let events = match &args.events_file {
        Some(path) => Some(EventEmitter::from_file(path)?),
        None => None,
    };

    let count = purge_store(&store, events.as_ref()).await?;
    println!("Removed {count} winner(s).");
    Ok(())
}

/// Purges `store`, logging and emitting the outcome.
///
/// # Errors
///
/// Returns [`SlotDrawError::Store`] if the purge fails.
pub async fn purge_store(
    store: &dyn WinnerStore,
    events: Option<&EventEmitter>,
) -> Result<usize, SlotDrawError> {
    let count = match store.purge_all().await {
        Ok(count) => count,
        Err(e) => {
            error!(error = %e, "failed to purge winners");
            metrics::record_store_error("purge");
            return Err(e.into());
        }
    };

    if count == 0 {
        info!("winner store already empty");
        return Ok(0);
    }

    info!(count, "winners purged");
    if let Some(events) = events {
        events.emit(Event::WinnersPurged {
            timestamp: Utc::now(),
            count,
        });
    }
    Ok(count)
}

/// Renders stored winners, most recent first.
///
/// # Errors
///
/// Returns [`SlotDrawError::Json`] if JSON encoding fails.
pub fn format_winners(winners: &[Winner], format: OutputFormat) -> Result<String, SlotDrawError> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(winners)?)),
        OutputFormat::Human if winners.is_empty() => Ok("No winners recorded.\n".to_string()),
        OutputFormat::Human => {
            let name_width = winners
                .iter()
                .map(|w| w.name.chars().count())
                .max()
                .unwrap_or(0)
                .max("NAME".len());
            let mut out = format!("{:<20}  {:<name_width$}  TICKETS\n", "WON AT", "NAME");
            for w in winners {
                let won_at = w.won_at.format("%Y-%m-%d %H:%M:%S").to_string();
                let _ = writeln!(out, "{won_at:<20}  {:<name_width$}  {}", w.name, w.tickets);
            }
            Ok(out)
        }
    }
}
