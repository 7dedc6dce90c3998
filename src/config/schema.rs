//! Configuration schema
//!
//! ```yaml
//! name: Spring raffle
//! winners: 3
//! seed: 42
//! timing:
//!   countdown_start: 5
//!   scroll_ceiling: 250ms
//! pool:
//!   - id: c1
//!     name: Ada
//!     tickets: 4
//!   - name: Bo
//!     weight: 1
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::draw::{Candidate, DrawRequest};
use crate::error::{ConfigError, DrawError};
use crate::reveal::RevealTiming;

/// Top-level draw configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrawConfig {
    /// Optional human-readable name of the draw
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Number of winners to draw
    pub winners: i64,

    /// Candidate pool, in display order
    #[serde(default)]
    pub pool: Vec<CandidateEntry>,

    /// Reveal timing overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingConfig>,

    /// Seed for a reproducible draw
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// One candidate in the pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CandidateEntry {
    /// Unique id; defaults to the 1-based position in the pool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name
    pub name: String,

    /// Ticket count; negative values are rejected by validation
    #[serde(alias = "tickets")]
    pub weight: i64,
}

/// Reveal timing overrides. Durations use humantime syntax (`"50ms"`, `"1s"`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingConfig {
    /// Countdown length in ticks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown_start: Option<u32>,

    /// Time between countdown ticks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown_tick: Option<String>,

    /// First scroll interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_initial: Option<String>,

    /// Growth of the scroll interval per tick
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_step: Option<String>,

    /// Scroll interval at which the reveal settles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_ceiling: Option<String>,

    /// Pause between settling and completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_pause: Option<String>,

    /// Text shown during the countdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl CandidateEntry {
    /// Id of the entry at `index`, falling back to its 1-based position.
    #[must_use]
    pub fn resolved_id(&self, index: usize) -> String {
        self.id.clone().unwrap_or_else(|| (index + 1).to_string())
    }
}

impl TimingConfig {
    /// Merges these overrides over `base`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a duration does not parse.
    pub fn apply(&self, base: RevealTiming) -> Result<RevealTiming, ConfigError> {
        Ok(RevealTiming {
            countdown_start: self.countdown_start.unwrap_or(base.countdown_start),
            countdown_tick: parse_or(
                "countdown_tick",
                self.countdown_tick.as_deref(),
                base.countdown_tick,
            )?,
            scroll_initial: parse_or(
                "scroll_initial",
                self.scroll_initial.as_deref(),
                base.scroll_initial,
            )?,
            scroll_step: parse_or("scroll_step", self.scroll_step.as_deref(), base.scroll_step)?,
            scroll_ceiling: parse_or(
                "scroll_ceiling",
                self.scroll_ceiling.as_deref(),
                base.scroll_ceiling,
            )?,
            settle_pause: parse_or(
                "settle_pause",
                self.settle_pause.as_deref(),
                base.settle_pause,
            )?,
            placeholder: self.placeholder.clone().unwrap_or(base.placeholder),
        })
    }
}

fn parse_or(field: &str, raw: Option<&str>, default: Duration) -> Result<Duration, ConfigError> {
    raw.map_or(Ok(default), |raw| {
        humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::InvalidValue {
            field: format!("timing.{field}"),
            value: raw.to_string(),
            expected: format!("a duration such as \"250ms\" ({e})"),
        })
    })
}

impl DrawConfig {
    /// Reveal timing for this draw: defaults with the file's overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a duration does not parse.
    pub fn timing(&self) -> Result<RevealTiming, ConfigError> {
        match &self.timing {
            Some(overrides) => overrides.apply(RevealTiming::default()),
            None => Ok(RevealTiming::default()),
        }
    }

    /// Candidates in pool order. Fails on the first negative weight.
    ///
    /// # Errors
    ///
    /// Returns [`DrawError::InvalidArgument`] for a negative weight.
    pub fn candidates(&self) -> Result<Vec<Candidate>, DrawError> {
        self.pool
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let weight = u64::try_from(entry.weight).map_err(|_| {
                    DrawError::invalid(
                        format!("pool[{i}].weight"),
                        format!("got {}, weights must be >= 0", entry.weight),
                    )
                })?;
                Ok(Candidate::new(entry.resolved_id(i), entry.name.clone(), weight))
            })
            .collect()
    }

    /// Builds the draw request described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DrawError::InvalidArgument`] for a negative weight or a
    /// negative winner count.
    pub fn into_request(&self) -> Result<DrawRequest, DrawError> {
        DrawRequest::new(self.candidates()?, self.winners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> DrawConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn tickets_alias_and_default_ids() {
        let config = parse(
            "winners: 2\npool:\n  - name: Ada\n    tickets: 3\n  - id: bo\n    name: Bo\n    weight: 1\n",
        );
        let candidates = config.candidates().unwrap();
        assert_eq!(candidates[0], Candidate::new("1", "Ada", 3));
        assert_eq!(candidates[1], Candidate::new("bo", "Bo", 1));
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<DrawConfig, _> = serde_yaml::from_str("winners: 1\nprizes: 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn negative_weight_is_invalid_argument() {
        let config = parse("winners: 1\npool:\n  - name: Ada\n    weight: -2\n");
        let err = config.into_request().unwrap_err();
        assert_eq!(
            err,
            DrawError::invalid("pool[0].weight", "got -2, weights must be >= 0")
        );
    }

    #[test]
    fn negative_winners_is_invalid_argument() {
        let config = parse("winners: -1\npool:\n  - name: Ada\n    weight: 2\n");
        assert!(matches!(
            config.into_request(),
            Err(DrawError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn into_request_keeps_count_and_order() {
        let config = parse(
            "winners: 5\npool:\n  - name: A\n    weight: 1\n  - name: B\n    weight: 0\n",
        );
        let request = config.into_request().unwrap();
        assert_eq!(request.winner_count(), 5);
        assert_eq!(request.effective_winner_count(), 1);
        assert_eq!(request.candidates()[1].name, "B");
    }

    #[test]
    fn timing_defaults_without_section() {
        let config = parse("winners: 1\n");
        let timing = config.timing().unwrap();
        assert_eq!(timing.countdown_start, 10);
        assert_eq!(timing.scroll_ceiling, Duration::from_millis(300));
    }

    #[test]
    fn timing_overrides_merge_over_defaults() {
        let config = parse(
            "winners: 1\ntiming:\n  countdown_start: 3\n  scroll_step: 20ms\n  settle_pause: 2s\n  placeholder: Hold on\n",
        );
        let timing = config.timing().unwrap();
        assert_eq!(timing.countdown_start, 3);
        assert_eq!(timing.scroll_step, Duration::from_millis(20));
        assert_eq!(timing.settle_pause, Duration::from_secs(2));
        assert_eq!(timing.scroll_initial, Duration::from_millis(50));
        assert_eq!(timing.placeholder, "Hold on");
    }

    #[test]
    fn bad_duration_names_field() {
        let config = parse("winners: 1\ntiming:\n  scroll_initial: quickly\n");
        match config.timing() {
            Err(ConfigError::InvalidValue { field, value, .. }) => {
                assert_eq!(field, "timing.scroll_initial");
                assert_eq!(value, "quickly");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }
}
