//! `slotdraw draw`: run a draw with the animated reveal.

use std::io::IsTerminal;
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cli::args::{DrawArgs, OutputFormat};
use crate::cli::render::render_display;
use crate::config::{ConfigLoader, DrawConfig};
use crate::draw::{DrawRequest, DrawResult, RngSource};
use crate::error::SlotDrawError;
use crate::observability::events::{Event, EventEmitter};
use crate::observability::metrics;
use crate::reveal::{RevealController, RevealTiming};
use crate::store::{JsonlWinnerStore, WinnerStore, winners_from_result};

/// Everything needed to start one run, after CLI overrides.
#[derive(Debug)]
pub struct DrawPlan {
    /// Pool and winner count
    pub request: DrawRequest,
    /// Reveal timing
    pub timing: RevealTiming,
    /// Seed, if the draw should be reproducible
    pub seed: Option<u64>,
}

impl DrawPlan {
    /// Applies the command-line overrides to a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns a config error for unparsable timing and a draw error for
    /// negative weights, a negative winner count, or timing that cannot
    /// terminate.
    pub fn from_config(config: &DrawConfig, args: &DrawArgs) -> Result<Self, SlotDrawError> {
        let configured = config.timing()?;
        let timing = if args.fast {
            RevealTiming {
                placeholder: configured.placeholder,
                ..RevealTiming::fast()
            }
        } else {
            configured
        };
        timing.validate()?;

        let winners = args.winners.unwrap_or(config.winners);
        let request = DrawRequest::new(config.candidates()?, winners)?;

        Ok(Self {
            request,
            timing,
            seed: args.seed.or(config.seed),
        })
    }
}

/// Runs `slotdraw draw`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the run is cancelled,
/// or the winners cannot be recorded.
pub async fn run(
    args: &DrawArgs,
    quiet: bool,
    cancel: CancellationToken,
) -> Result<(), SlotDrawError> {
    if let Some(port) = args.metrics_port {
        metrics::init_metrics(Some(port))?;
        info!(port, "Prometheus metrics endpoint started");
    }

    let load_result = ConfigLoader::with_defaults().load(&args.config)?;
    for warning in &load_result.warnings {
        warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    let config = load_result.config;
    if let Some(name) = &config.name {
        info!(draw = %name, "loaded draw");
    }

    let plan = DrawPlan::from_config(&config, args)?;

    let events = match &args.events_file {
        Some(path) => Some(Arc::new(EventEmitter::from_file(path)?)),
        None => None,
    };

    let winners = reveal(plan, events.clone(), !quiet, cancel).await?;
    print_winners(&winners, args.format)?;

    if let Some(path) = &args.store {
        let store = JsonlWinnerStore::new(path);
        record(&store, &winners, events.as_deref()).await?;
    }

    Ok(())
}

/// Plays the reveal and returns the winners.
///
/// With `show`, the display is rendered to stderr while the run is in
/// flight. Fires `cancel` to abort; the run then yields
/// [`SlotDrawError::Cancelled`] and nothing is drawn.
///
/// # Errors
///
/// Returns [`SlotDrawError::Cancelled`] if the run does not complete.
pub async fn reveal(
    plan: DrawPlan,
    events: Option<Arc<EventEmitter>>,
    show: bool,
    cancel: CancellationToken,
) -> Result<DrawResult, SlotDrawError> {
    let mut controller = match plan.seed {
        Some(seed) => RevealController::new(plan.timing, RngSource::seeded(seed)),
        None => RevealController::new(plan.timing, RngSource::from_os()),
    };
    if let Some(events) = events {
        controller = controller.with_events(events);
    }

    let renderer = show.then(|| {
        let live = std::io::stderr().is_terminal();
        tokio::spawn(render_display(controller.display(), std::io::stderr(), live))
    });

    let (_, completion) = controller.start_with_receiver(plan.request);

    let outcome = tokio::select! {
        result = completion => result.map_err(|_| SlotDrawError::Cancelled),
        () = cancel.cancelled() => {
            controller.cancel();
            Err(SlotDrawError::Cancelled)
        }
    };

    if let Some(renderer) = renderer {
        if outcome.is_ok() {
            let _ = renderer.await;
        } else {
            renderer.abort();
        }
    }

    outcome
}

/// Prints the winners to stdout.
fn print_winners(winners: &DrawResult, format: OutputFormat) -> Result<(), SlotDrawError> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(winners)?),
        OutputFormat::Human if winners.is_empty() => println!("No winners drawn."),
        OutputFormat::Human => {
            println!("Winners:");
            for (rank, winner) in winners.iter().enumerate() {
                println!(
                    "  {}. {} (id {}, {} tickets)",
                    rank + 1,
                    winner.name,
                    winner.id,
                    winner.weight
                );
            }
        }
    }
    Ok(())
}

/// Writes the winners of a completed run to `store`.
///
/// # Errors
///
/// Returns [`SlotDrawError::Store`] if the insert fails.
pub async fn record(
    store: &dyn WinnerStore,
    winners: &DrawResult,
    events: Option<&EventEmitter>,
) -> Result<(), SlotDrawError> {
    if winners.is_empty() {
        return Ok(());
    }

    let records = winners_from_result(winners, Utc::now());
    if let Err(e) = store.insert_many(&records).await {
        error!(error = %e, "failed to record winners");
        metrics::record_store_error("insert");
        return Err(e.into());
    }

    info!(count = records.len(), "winners recorded");
    if let Some(events) = events {
        events.emit(Event::WinnersRecorded {
            timestamp: Utc::now(),
            count: records.len(),
        });
    }
    Ok(())
}
