//! Display state of the reveal animation.

use serde::{Deserialize, Serialize};

/// A named stage of the reveal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No run in flight, no timers pending.
    #[default]
    Idle,
    /// Counting down once per second before the names start moving.
    Countdown,
    /// Names cycle round-robin at an ever slower pace.
    Scrolling,
    /// Scroll interval hit its ceiling; one last pause before the result.
    Settling,
    /// Winners have been drawn and handed to the caller.
    Complete,
}

impl Phase {
    /// Every phase in visiting order.
    pub const ALL: [Self; 5] = [
        Self::Idle,
        Self::Countdown,
        Self::Scrolling,
        Self::Settling,
        Self::Complete,
    ];

    /// Lowercase name, also used as the metrics label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Countdown => "countdown",
            Self::Scrolling => "scrolling",
            Self::Settling => "settling",
            Self::Complete => "complete",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a run as seen by the presentation layer.
///
/// `run_id` names the run that wrote the value; `0` means no run has
/// claimed the display. `elapsed_speed_ms` is the current scroll interval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseState {
    /// Run that owns this value (0 when idle)
    pub run_id: u64,
    /// Current phase
    pub phase: Phase,
    /// Seconds left in the countdown
    pub countdown_remaining: u32,
    /// Name (or placeholder) currently on screen
    pub displayed_name: String,
    /// Current scroll interval in milliseconds
    pub elapsed_speed_ms: u64,
}

impl PhaseState {
    /// Returns whether a run is in flight (neither idle nor complete).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Idle | Phase::Complete)
    }
}
