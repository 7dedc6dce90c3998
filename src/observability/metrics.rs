//! Metrics collection for `slotdraw`.
//!
//! Prometheus-compatible metrics through the `metrics` facade. Without an
//! installed recorder every call is a no-op, so library users pay nothing.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::SlotDrawError;
use crate::reveal::Phase;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without an
/// HTTP endpoint.
///
/// # Errors
///
/// Returns `SlotDrawError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), SlotDrawError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| SlotDrawError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!("slotdraw_draws_started_total", "Draw runs started");
    describe_counter!("slotdraw_draws_completed_total", "Draw runs completed");
    describe_counter!(
        "slotdraw_draws_cancelled_total",
        "Draw runs cancelled before completion"
    );
    describe_counter!(
        "slotdraw_phase_transitions_total",
        "Reveal phase transitions by target phase"
    );
    describe_gauge!(
        "slotdraw_current_phase",
        "Currently active reveal phase (1 = active)"
    );
    describe_histogram!("slotdraw_winners_selected", "Winners drawn per run");
    describe_counter!(
        "slotdraw_store_errors_total",
        "Winner store operations that failed"
    );
}

/// Records the start of a run.
pub fn record_draw_started() {
    counter!("slotdraw_draws_started_total").increment(1);
}

/// Records a phase transition and moves the current-phase gauge.
pub fn record_phase_entered(phase: Phase) {
    counter!("slotdraw_phase_transitions_total", "phase" => phase.as_str()).increment(1);
    set_current_phase(phase);
}

/// Records a completed run with its number of winners.
#[allow(clippy::cast_precision_loss)]
pub fn record_draw_completed(winners: usize) {
    counter!("slotdraw_draws_completed_total").increment(1);
    histogram!("slotdraw_winners_selected").record(winners as f64);
}

/// Records a run torn down before completion.
pub fn record_draw_cancelled() {
    counter!("slotdraw_draws_cancelled_total").increment(1);
    set_current_phase(Phase::Idle);
}

/// Records a failed store operation.
pub fn record_store_error(operation: &'static str) {
    counter!("slotdraw_store_errors_total", "operation" => operation).increment(1);
}

fn set_current_phase(active: Phase) {
    for phase in Phase::ALL {
        let value = if phase == active { 1.0 } else { 0.0 };
        gauge!("slotdraw_current_phase", "phase" => phase.as_str()).set(value);
    }
}
