//! Reveal controller: timer ownership, restart and teardown.
//!
//! Each run gets one driver task. The driver owns the run's [`RevealRun`]
//! and awaits exactly one pending sleep at a time: the next tick. A tick
//! finishes its work and only then schedules its successor, so ticks of a
//! run are totally ordered and never overlap.
//!
//! Starting a new run (or tearing the controller down) cancels the previous
//! driver before anything new is scheduled. On top of that, every write to
//! the display signal is fenced on the run id, so a driver that is already
//! past its last await when it gets cancelled still cannot touch the state
//! of the run that replaced it.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::draw::{DrawRequest, DrawResult, UniformSource};
use crate::observability::events::{Event, EventEmitter};
use crate::observability::metrics;

use super::run::{RevealRun, Step};
use super::state::{Phase, PhaseState};
use super::timing::RevealTiming;

/// Randomness shared between the controller and its current driver.
type SharedSource = Arc<Mutex<Box<dyn UniformSource + Send>>>;

/// Completion callback of a run.
type OnComplete = Box<dyn FnOnce(DrawResult) + Send + 'static>;

/// Drives the reveal animation and triggers the draw on completion.
///
/// Only one run is ever in flight. [`start`](Self::start) restarts,
/// [`cancel`](Self::cancel) tears down, and dropping the controller cancels
/// whatever is running.
pub struct RevealController {
    timing: RevealTiming,
    source: SharedSource,
    display: watch::Sender<PhaseState>,
    events: Option<Arc<EventEmitter>>,
    active: Option<ActiveRun>,
    last_run_id: u64,
}

/// Handle to the in-flight run's timer chain.
struct ActiveRun {
    id: u64,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RevealController {
    /// Creates an idle controller.
    #[must_use]
    pub fn new(timing: RevealTiming, source: impl UniformSource + Send + 'static) -> Self {
        let (display, _) = watch::channel(PhaseState::default());
        Self {
            timing,
            source: Arc::new(Mutex::new(Box::new(source))),
            display,
            events: None,
            active: None,
            last_run_id: 0,
        }
    }

    /// Attaches a structured event stream.
    #[must_use]
    pub fn with_events(mut self, events: Arc<EventEmitter>) -> Self {
        self.events = Some(events);
        self
    }

    /// Subscribes to the display signal.
    #[must_use]
    pub fn display(&self) -> watch::Receiver<PhaseState> {
        self.display.subscribe()
    }

    /// Current display state.
    #[must_use]
    pub fn snapshot(&self) -> PhaseState {
        self.display.borrow().clone()
    }

    /// Returns whether a run is between `countdown` and `settling`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active.is_some() && self.display.borrow().is_active()
    }

    /// Timing used for new runs.
    #[must_use]
    pub const fn timing(&self) -> &RevealTiming {
        &self.timing
    }

    /// Starts a run, cancelling any run already in flight.
    ///
    /// `on_complete` is called exactly once with the winners if the run
    /// reaches `complete`, and never if it is cancelled first. Returns the
    /// new run's id.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start<F>(&mut self, request: DrawRequest, on_complete: F) -> u64
    where
        F: FnOnce(DrawResult) + Send + 'static,
    {
        self.stop_active("restart");

        self.last_run_id += 1;
        let run_id = self.last_run_id;

        let mut run = RevealRun::new(run_id, request, self.timing.clone());
        let first = run.begin();

        info!(
            run_id,
            candidates = run.request().candidates().len(),
            winner_count = run.request().winner_count(),
            "draw started"
        );
        metrics::record_draw_started();
        metrics::record_phase_entered(run.state().phase);
        self.emit(Event::DrawStarted {
            timestamp: Utc::now(),
            run_id,
            candidates: run.request().candidates().len(),
            winner_count: run.request().winner_count(),
        });
        self.emit(Event::PhaseEntered {
            timestamp: Utc::now(),
            run_id,
            phase: run.state().phase,
        });

        // Claim the display before the driver exists; any older writer is
        // now fenced out by the run id.
        self.display.send_replace(run.state().clone());

        let cancel = CancellationToken::new();
        let driver = Driver {
            run_id,
            display: self.display.clone(),
            source: Arc::clone(&self.source),
            events: self.events.clone(),
            cancel: cancel.clone(),
            on_complete: Box::new(on_complete),
        };
        let task = tokio::spawn(driver.drive(run, first));

        self.active = Some(ActiveRun {
            id: run_id,
            cancel,
            task,
        });
        run_id
    }

    /// Starts a run whose result is delivered through a channel.
    ///
    /// The receiver errors if the run is cancelled.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start_with_receiver(
        &mut self,
        request: DrawRequest,
    ) -> (u64, oneshot::Receiver<DrawResult>) {
        let (tx, rx) = oneshot::channel();
        let run_id = self.start(request, move |winners| {
            let _ = tx.send(winners);
        });
        (run_id, rx)
    }

    /// Tears down the current run and resets the display to `idle`.
    ///
    /// Also used to reset a `complete` controller. A cancelled run's
    /// callback is never invoked.
    pub fn cancel(&mut self) {
        self.stop_active("cancel");
        self.display.send_replace(PhaseState::default());
    }

    /// Cancels the active run's timer chain, if any.
    fn stop_active(&mut self, reason: &'static str) {
        let Some(active) = self.active.take() else {
            return;
        };
        active.cancel.cancel();
        active.task.abort();

        let state = self.display.borrow().clone();
        if state.run_id == active.id && state.phase != Phase::Complete {
            info!(run_id = active.id, phase = %state.phase, reason, "draw cancelled");
            metrics::record_draw_cancelled();
            self.emit(Event::DrawCancelled {
                timestamp: Utc::now(),
                run_id: active.id,
                phase: state.phase,
            });
        }
    }

    fn emit(&self, event: Event) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }
}

impl Drop for RevealController {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            active.task.abort();
        }
    }
}

impl std::fmt::Debug for RevealController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealController")
            .field("timing", &self.timing)
            .field("active_run", &self.active.as_ref().map(|a| a.id))
            .field("phase", &self.display.borrow().phase)
            .finish_non_exhaustive()
    }
}

/// Everything the driver task of one run needs.
struct Driver {
    run_id: u64,
    display: watch::Sender<PhaseState>,
    source: SharedSource,
    events: Option<Arc<EventEmitter>>,
    cancel: CancellationToken,
    on_complete: OnComplete,
}

impl Driver {
    /// Runs the timer chain until the run resolves or is cancelled.
    async fn drive(self, mut run: RevealRun, mut step: Step) {
        while let Step::Wait(delay) = step {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    debug!(run_id = self.run_id, "pending tick dropped");
                    return;
                }
                () = tokio::time::sleep(delay) => {}
            }

            let before = run.state().phase;
            step = run.tick();
            if !self.publish(run.state()) {
                debug!(run_id = self.run_id, "run superseded; stopping");
                return;
            }
            let after = run.state().phase;
            if after == before {
                trace!(
                    run_id = self.run_id,
                    name = %run.state().displayed_name,
                    countdown = run.state().countdown_remaining,
                    speed_ms = run.state().elapsed_speed_ms,
                    "tick"
                );
            } else {
                self.phase_entered(after);
            }
        }

        self.resolve(run);
    }

    /// Draws the winners and completes the run, unless it was cancelled.
    fn resolve(self, mut run: RevealRun) {
        if self.cancel.is_cancelled() {
            return;
        }

        let winners = {
            let mut source = self.source.lock().unwrap_or_else(PoisonError::into_inner);
            run.request().draw(&mut **source)
        };

        run.complete();
        if !self.publish(run.state()) {
            return;
        }
        self.phase_entered(Phase::Complete);

        info!(
            run_id = self.run_id,
            requested = run.request().winner_count(),
            drawn = winners.len(),
            "draw complete"
        );
        metrics::record_draw_completed(winners.len());
        if let Some(events) = &self.events {
            events.emit(Event::DrawCompleted {
                timestamp: Utc::now(),
                run_id: self.run_id,
                winners: winners.iter().map(|w| w.id.clone()).collect(),
            });
        }

        (self.on_complete)(winners);
    }

    /// Writes `state` to the display if this run still owns it.
    ///
    /// Returns `false` once another run (or a reset) has taken over.
    fn publish(&self, state: &PhaseState) -> bool {
        let mut owned = false;
        self.display.send_if_modified(|current| {
            if current.run_id != state.run_id {
                return false;
            }
            owned = true;
            if current == state {
                return false;
            }
            current.clone_from(state);
            true
        });
        owned
    }

    fn phase_entered(&self, phase: Phase) {
        debug!(run_id = self.run_id, %phase, "phase entered");
        metrics::record_phase_entered(phase);
        if let Some(events) = &self.events {
            events.emit(Event::PhaseEntered {
                timestamp: Utc::now(),
                run_id: self.run_id,
                phase,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;
    use crate::draw::{Candidate, RngSource};

    fn pool() -> Vec<Candidate> {
        vec![
            Candidate::new("a", "Ada", 1),
            Candidate::new("b", "Bo", 1),
            Candidate::new("c", "Cy", 8),
        ]
    }

    fn controller() -> RevealController {
        RevealController::new(RevealTiming::default(), RngSource::seeded(7))
    }

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce(DrawResult) + Send + 'static) {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        (calls, move |_winners: DrawResult| {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn completes_with_winners_after_full_timeline() {
        let mut ctl = controller();
        let started = Instant::now();
        let (_, rx) = ctl.start_with_receiver(DrawRequest::with_count(pool(), 2));

        let winners = rx.await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(winners.len(), 2);
        assert_ne!(winners[0].id, winners[1].id);
        assert!(elapsed >= Duration::from_millis(16_518), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(17_000), "{elapsed:?}");
        assert_eq!(ctl.snapshot().phase, Phase::Complete);
        assert!(!ctl.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn display_visits_phases_in_order() {
        let mut ctl = controller();
        let mut display = ctl.display();
        let (_, rx) = ctl.start_with_receiver(DrawRequest::with_count(pool(), 1));

        let mut phases = vec![display.borrow_and_update().phase];
        let mut speeds = Vec::new();
        while display.changed().await.is_ok() {
            let state = display.borrow_and_update().clone();
            if state.phase == Phase::Scrolling {
                speeds.push(state.elapsed_speed_ms);
            }
            if phases.last() != Some(&state.phase) {
                phases.push(state.phase);
            }
            if state.phase == Phase::Complete {
                break;
            }
        }
        rx.await.unwrap();

        assert_eq!(
            phases,
            vec![
                Phase::Countdown,
                Phase::Scrolling,
                Phase::Settling,
                Phase::Complete
            ]
        );
        assert!(speeds.windows(2).all(|w| w[0] <= w[1]), "{speeds:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_every_second() {
        let ctl_timing = RevealTiming::default();
        let mut ctl = RevealController::new(ctl_timing, RngSource::seeded(1));
        let (calls, on_complete) = counter();
        ctl.start(DrawRequest::with_count(pool(), 1), on_complete);

        assert_eq!(ctl.snapshot().countdown_remaining, 10);
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        let state = ctl.snapshot();
        assert_eq!(state.phase, Phase::Countdown);
        assert_eq!(state.countdown_remaining, 7);
        assert_eq!(state.displayed_name, "Get ready for the magic...");
        assert!(ctl.is_running());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_mid_scroll_supersedes_previous_run() {
        let mut ctl = controller();
        let (first_calls, first_cb) = counter();
        let first_id = ctl.start(DrawRequest::with_count(pool(), 1), first_cb);

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(ctl.snapshot().phase, Phase::Scrolling);

        let mut display = ctl.display();
        let started = Instant::now();
        let (second_id, rx) = ctl.start_with_receiver(DrawRequest::with_count(pool(), 1));
        assert_ne!(first_id, second_id);
        assert_eq!(ctl.snapshot().phase, Phase::Countdown);

        let mut updates = 0;
        loop {
            display.changed().await.unwrap();
            let state = display.borrow_and_update().clone();
            assert_eq!(state.run_id, second_id, "stale write from old run");
            updates += 1;
            if state.phase == Phase::Complete {
                break;
            }
        }
        let winners = rx.await.unwrap();
        assert_eq!(winners.len(), 1);

        // a single chain runs the full timeline once, not at double speed
        assert!(started.elapsed() >= Duration::from_millis(16_518));
        // 10 countdown values, 32 names, settle hold, complete at most
        assert!(updates <= 10 + 32 + 2, "{updates} updates");

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(first_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_fires_only_latest_callback() {
        let mut ctl = controller();
        let (first_calls, first_cb) = counter();
        let (second_calls, second_cb) = counter();
        ctl.start(DrawRequest::with_count(pool(), 1), first_cb);
        ctl.start(DrawRequest::with_count(pool(), 1), second_cb);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(first_calls.load(Ordering::SeqCst), 0);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_resets_to_idle_and_stays_there() {
        let mut ctl = controller();
        let (calls, on_complete) = counter();
        ctl.start(DrawRequest::with_count(pool(), 1), on_complete);

        tokio::time::sleep(Duration::from_millis(12_000)).await;
        assert!(ctl.is_running());
        ctl.cancel();
        assert_eq!(ctl.snapshot(), PhaseState::default());
        assert!(!ctl.is_running());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(ctl.snapshot(), PhaseState::default());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_receiver_errors() {
        let mut ctl = controller();
        let (_, rx) = ctl.start_with_receiver(DrawRequest::with_count(pool(), 1));
        tokio::time::sleep(Duration::from_secs(2)).await;
        ctl.cancel();
        assert!(rx.await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_run() {
        let mut ctl = controller();
        let (calls, on_complete) = counter();
        ctl.start(DrawRequest::with_count(pool(), 1), on_complete);
        let display = ctl.display();
        drop(ctl);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        // the sender is gone with the controller and its driver
        assert!(display.has_changed().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn complete_can_be_reset_and_restarted() {
        let mut ctl = RevealController::new(RevealTiming::fast(), RngSource::seeded(3));
        let (_, rx) = ctl.start_with_receiver(DrawRequest::with_count(pool(), 3));
        assert_eq!(rx.await.unwrap().len(), 3);
        assert_eq!(ctl.snapshot().phase, Phase::Complete);

        ctl.cancel();
        assert_eq!(ctl.snapshot().phase, Phase::Idle);

        let (_, rx) = ctl.start_with_receiver(DrawRequest::with_count(pool(), 1));
        assert_eq!(rx.await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_weight_pool_completes_short() {
        let mut ctl = RevealController::new(RevealTiming::fast(), RngSource::seeded(3));
        let request = DrawRequest::with_count(
            vec![Candidate::new("a", "Ada", 0), Candidate::new("b", "Bo", 5)],
            2,
        );
        let (_, rx) = ctl.start_with_receiver(request);
        let winners = rx.await.unwrap();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].id, "b");
    }

    #[tokio::test(start_paused = true)]
    async fn empty_pool_completes_empty() {
        let mut ctl = RevealController::new(RevealTiming::fast(), RngSource::seeded(3));
        let (_, rx) = ctl.start_with_receiver(DrawRequest::with_count(vec![], 2));
        assert!(rx.await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn seeded_controller_matches_direct_draw() {
        let request = DrawRequest::with_count(pool(), 2);
        let expected = request.draw(&mut RngSource::seeded(99));

        let mut ctl = RevealController::new(RevealTiming::fast(), RngSource::seeded(99));
        let (_, rx) = ctl.start_with_receiver(request);
        assert_eq!(rx.await.unwrap(), expected);
    }
}
