//! Pool entries and draw requests.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DrawError;

use super::engine;
use super::source::UniformSource;

/// An entrant eligible for selection.
///
/// `weight` is the ticket count. A zero-weight candidate stays in the pool
/// (and is shown during the reveal) but can never win.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique identifier within the pool
    pub id: String,
    /// Display name
    pub name: String,
    /// Ticket count
    pub weight: u64,
}

impl Candidate {
    /// Creates a candidate.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, weight: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight,
        }
    }

    /// Returns whether this candidate can be selected at all.
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        self.weight > 0
    }
}

/// Ordered winners of one draw: distinct ids, every weight > 0.
///
/// May be shorter than the requested count.
pub type DrawResult = Vec<Candidate>;

/// A candidate pool plus the number of winners wanted from it.
///
/// The pool is shared read-only for the lifetime of a run, hence the `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRequest {
    candidates: Arc<[Candidate]>,
    winner_count: usize,
}

impl DrawRequest {
    /// Builds a request from untrusted input.
    ///
    /// # Errors
    ///
    /// Returns [`DrawError::InvalidArgument`] if `winner_count` is negative.
    pub fn new(candidates: Vec<Candidate>, winner_count: i64) -> Result<Self, DrawError> {
        let count = usize::try_from(winner_count).map_err(|_| {
            DrawError::invalid(
                "winner_count",
                format!("got {winner_count}, must not be negative"),
            )
        })?;
        Ok(Self::with_count(candidates, count))
    }

    /// Builds a request from an already validated count.
    #[must_use]
    pub fn with_count(candidates: Vec<Candidate>, winner_count: usize) -> Self {
        Self {
            candidates: candidates.into(),
            winner_count,
        }
    }

    /// The full pool, in display order.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// The count the caller asked for.
    #[must_use]
    pub const fn winner_count(&self) -> usize {
        self.winner_count
    }

    /// `min(winner_count, number of candidates with weight > 0)`.
    #[must_use]
    pub fn effective_winner_count(&self) -> usize {
        let eligible = self.candidates.iter().filter(|c| c.is_eligible()).count();
        self.winner_count.min(eligible)
    }

    /// Runs the weighted draw for this request.
    pub fn draw<S: UniformSource + ?Sized>(&self, source: &mut S) -> DrawResult {
        engine::select(&self.candidates, self.winner_count, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Vec<Candidate> {
        vec![
            Candidate::new("a", "Ada", 0),
            Candidate::new("b", "Bo", 5),
            Candidate::new("c", "Cy", 2),
        ]
    }

    #[test]
    fn negative_count_is_invalid_argument() {
        let err = DrawRequest::new(pool(), -1).unwrap_err();
        assert!(matches!(err, DrawError::InvalidArgument { ref argument, .. } if argument == "winner_count"));
    }

    #[test]
    fn zero_count_is_accepted() {
        let req = DrawRequest::new(pool(), 0).unwrap();
        assert_eq!(req.effective_winner_count(), 0);
    }

    #[test]
    fn effective_count_ignores_zero_weight() {
        let req = DrawRequest::new(pool(), 10).unwrap();
        assert_eq!(req.winner_count(), 10);
        assert_eq!(req.effective_winner_count(), 2);
    }

    #[test]
    fn effective_count_keeps_smaller_request() {
        let req = DrawRequest::with_count(pool(), 1);
        assert_eq!(req.effective_winner_count(), 1);
    }

    #[test]
    fn candidate_serde_shape() {
        let json = serde_json::to_value(Candidate::new("7", "Gus", 3)).unwrap();
        assert_eq!(json, serde_json::json!({"id": "7", "name": "Gus", "weight": 3}));
    }
}
