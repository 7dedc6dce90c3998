//! Clock-free step machine for a single reveal run.
//!
//! [`RevealRun`] does one tick of work per call and says how long to wait
//! before the next one. It never sleeps and never spawns, so exactly one
//! next tick exists at any time: the one the caller schedules from the
//! returned [`Step`].

use std::time::Duration;

use crate::draw::DrawRequest;

use super::state::{Phase, PhaseState};
use super::timing::RevealTiming;

/// What the driver must do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Schedule the next tick after this delay.
    Wait(Duration),
    /// The settle pause is over: draw the winners and complete.
    Resolve,
}

/// Run-local state of one reveal.
#[derive(Debug, Clone)]
pub struct RevealRun {
    request: DrawRequest,
    timing: RevealTiming,
    state: PhaseState,
    cursor: usize,
    interval: Duration,
}

impl RevealRun {
    /// Creates an idle run. Call [`begin`](Self::begin) to enter the countdown.
    #[must_use]
    pub fn new(run_id: u64, request: DrawRequest, timing: RevealTiming) -> Self {
        Self {
            state: PhaseState {
                run_id,
                ..PhaseState::default()
            },
            cursor: 0,
            interval: timing.scroll_initial,
            request,
            timing,
        }
    }

    /// Current display state.
    #[must_use]
    pub const fn state(&self) -> &PhaseState {
        &self.state
    }

    /// The pool and count this run was started with.
    #[must_use]
    pub const fn request(&self) -> &DrawRequest {
        &self.request
    }

    /// Enters `countdown` with the placeholder on display.
    ///
    /// A countdown start of 0 goes straight to `scrolling`.
    pub fn begin(&mut self) -> Step {
        self.state.phase = Phase::Countdown;
        self.state.countdown_remaining = self.timing.countdown_start;
        self.state.displayed_name.clone_from(&self.timing.placeholder);
        self.state.elapsed_speed_ms = 0;

        if self.timing.countdown_start == 0 {
            return self.enter_scrolling();
        }
        Step::Wait(self.timing.countdown_tick)
    }

    /// Performs the work of one fired tick.
    pub fn tick(&mut self) -> Step {
        match self.state.phase {
            Phase::Idle => self.begin(),
            Phase::Countdown => {
                self.state.countdown_remaining = self.state.countdown_remaining.saturating_sub(1);
                if self.state.countdown_remaining == 0 {
                    self.enter_scrolling()
                } else {
                    Step::Wait(self.timing.countdown_tick)
                }
            }
            Phase::Scrolling => self.scroll(),
            Phase::Settling | Phase::Complete => Step::Resolve,
        }
    }

    /// Marks the run `complete`. The last displayed name stays on screen.
    pub const fn complete(&mut self) {
        self.state.phase = Phase::Complete;
    }

    fn enter_scrolling(&mut self) -> Step {
        self.state.phase = Phase::Scrolling;
        self.cursor = 0;
        self.interval = self.timing.scroll_initial;
        self.state.elapsed_speed_ms = as_millis(self.interval);
        self.scroll()
    }

    /// Shows the name under the cursor, then slows down.
    fn scroll(&mut self) -> Step {
        let pool = self.request.candidates();
        let Some(candidate) = pool.get(self.cursor) else {
            // nothing to show
            return self.enter_settling();
        };
        self.state.displayed_name.clone_from(&candidate.name);
        self.cursor = (self.cursor + 1) % pool.len();

        self.interval = self
            .interval
            .saturating_add(self.timing.scroll_step)
            .min(self.timing.scroll_ceiling);
        self.state.elapsed_speed_ms = as_millis(self.interval);

        if self.interval >= self.timing.scroll_ceiling {
            self.enter_settling()
        } else {
            Step::Wait(self.interval)
        }
    }

    const fn enter_settling(&mut self) -> Step {
        self.state.phase = Phase::Settling;
        Step::Wait(self.timing.settle_pause)
    }
}

fn as_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
