//! Reveal timing parameters.

use std::time::Duration;

use crate::error::DrawError;

/// Message shown while the countdown runs.
pub const DEFAULT_PLACEHOLDER: &str = "Get ready for the magic...";

/// Timing of one reveal.
///
/// The scroll interval starts at `scroll_initial`, grows by `scroll_step`
/// after every displayed name and is capped at `scroll_ceiling`. Reaching
/// the ceiling ends the scroll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealTiming {
    /// Countdown start value, in ticks
    pub countdown_start: u32,
    /// Countdown cadence
    pub countdown_tick: Duration,
    /// First scroll interval
    pub scroll_initial: Duration,
    /// Interval increase per displayed name
    pub scroll_step: Duration,
    /// Interval at which scrolling stops
    pub scroll_ceiling: Duration,
    /// Pause between the last name and the result
    pub settle_pause: Duration,
    /// Text displayed during the countdown
    pub placeholder: String,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            countdown_start: 10,
            countdown_tick: Duration::from_secs(1),
            scroll_initial: Duration::from_millis(50),
            scroll_step: Duration::from_millis(8),
            scroll_ceiling: Duration::from_millis(300),
            settle_pause: Duration::from_millis(1000),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl RevealTiming {
    /// Same phase structure compressed to well under a second: a 3-tick
    /// countdown at 10 ms, a scroll growing from 1 ms by 1 ms up to 20 ms,
    /// and a 10 ms settle.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            countdown_start: 3,
            countdown_tick: Duration::from_millis(10),
            scroll_initial: Duration::from_millis(1),
            scroll_step: Duration::from_millis(1),
            scroll_ceiling: Duration::from_millis(20),
            settle_pause: Duration::from_millis(10),
            ..Self::default()
        }
    }

    /// Checks that the timing describes a reveal that terminates.
    ///
    /// # Errors
    ///
    /// Returns [`DrawError::InvalidArgument`] for a zero countdown tick, a
    /// zero scroll step, or a ceiling below the initial interval.
    pub fn validate(&self) -> Result<(), DrawError> {
        if self.countdown_tick.is_zero() && self.countdown_start > 0 {
            return Err(DrawError::invalid(
                "countdown_tick",
                "must be greater than zero",
            ));
        }
        if self.scroll_step.is_zero() {
            return Err(DrawError::invalid("scroll_step", "must be greater than zero"));
        }
        if self.scroll_ceiling < self.scroll_initial {
            return Err(DrawError::invalid(
                "scroll_ceiling",
                format!(
                    "{} is below scroll_initial {}",
                    humantime::format_duration(self.scroll_ceiling),
                    humantime::format_duration(self.scroll_initial)
                ),
            ));
        }
        Ok(())
    }
}
