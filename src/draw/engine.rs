//! Weighted sampling without replacement via iterative roulette removal.

use tracing::debug;

use super::candidate::{Candidate, DrawResult};
use super::source::UniformSource;

/// Draws up to `winner_count` distinct winners from `candidates`.
///
/// Only candidates with weight > 0 enter the working set. Each round:
///
/// 1. `total` = sum of weights still in the working set
/// 2. `r` = uniform draw from `[0, total)`
/// 3. scan left to right subtracting each weight from `r`; the first
///    candidate at which `r <= 0` wins
/// 4. the winner leaves the working set
///
/// The first pick of candidate `i` therefore has probability
/// `weight_i / total`. Remaining weights are never renormalised; only the
/// denominator shrinks.
///
/// The result is shorter than `winner_count` when there are fewer eligible
/// candidates (or if the remaining weight ever reaches zero). That is a
/// normal outcome, not an error.
pub fn select<S: UniformSource + ?Sized>(
    candidates: &[Candidate],
    winner_count: usize,
    source: &mut S,
) -> DrawResult {
    let mut remaining: Vec<&Candidate> = candidates.iter().filter(|c| c.is_eligible()).collect();
    let rounds = winner_count.min(remaining.len());
    let mut winners = Vec::with_capacity(rounds);

    for round in 0..rounds {
        let total: u128 = remaining.iter().map(|c| u128::from(c.weight)).sum();
        if total == 0 {
            debug!(round, "remaining weight is zero; stopping early");
            break;
        }

        let target = scale(source.next_unit(), total);
        let index = roulette_index(&remaining, target);
        let winner = remaining.remove(index);
        debug!(round, total_weight = %total, winner = %winner.id, "selected");
        winners.push(winner.clone());
    }

    winners
}

#[allow(clippy::cast_precision_loss)]
fn scale(unit: f64, total: u128) -> f64 {
    unit.clamp(0.0, 1.0) * total as f64
}

/// Index of the first candidate at which the running remainder drops to
/// zero or below.
///
/// `pool` must be non-empty. Floating-point rounding can leave a tiny
/// positive remainder after the last candidate; the last one wins then.
#[allow(clippy::cast_precision_loss)]
fn roulette_index(pool: &[&Candidate], target: f64) -> usize {
    let mut running = target;
    for (i, candidate) in pool.iter().enumerate() {
        running -= candidate.weight as f64;
        if running <= 0.0 {
            return i;
        }
    }
    pool.len() - 1
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;
    use crate::draw::RngSource;

    /// Replays a fixed list of unit values.
    struct Scripted {
        values: Vec<f64>,
        next: usize,
    }

    impl Scripted {
        fn new(values: &[f64]) -> Self {
            Self {
                values: values.to_vec(),
                next: 0,
            }
        }
    }

    impl UniformSource for Scripted {
        fn next_unit(&mut self) -> f64 {
            let v = self.values[self.next % self.values.len()];
            self.next += 1;
            v
        }
    }

    fn c(id: &str, weight: u64) -> Candidate {
        Candidate::new(id, id.to_uppercase(), weight)
    }

    fn ids(result: &DrawResult) -> Vec<&str> {
        result.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn empty_pool_yields_empty_result() {
        let mut source = RngSource::seeded(0);
        assert!(select(&[], 3, &mut source).is_empty());
    }

    #[test]
    fn zero_count_yields_empty_result() {
        let mut source = RngSource::seeded(0);
        assert!(select(&[c("a", 1)], 0, &mut source).is_empty());
    }

    #[test]
    fn zero_weight_never_selected() {
        // pool [{A,0},{B,5}], winnerCount=2 -> exactly [B]
        let pool = [c("a", 0), c("b", 5)];
        let mut source = RngSource::seeded(9);
        for _ in 0..1_000 {
            let result = select(&pool, 2, &mut source);
            assert_eq!(ids(&result), vec!["b"]);
        }
    }

    #[test]
    fn all_zero_weights_yield_empty_result() {
        let pool = [c("a", 0), c("b", 0)];
        let mut source = RngSource::seeded(3);
        assert!(select(&pool, 2, &mut source).is_empty());
    }

    #[test]
    fn count_above_pool_is_truncated() {
        let pool = [c("a", 1), c("b", 2), c("c", 3)];
        let mut source = RngSource::seeded(5);
        let result = select(&pool, 10, &mut source);
        assert_eq!(result.len(), 3);
        let unique: HashSet<_> = ids(&result).into_iter().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn scan_picks_first_crossing() {
        // weights 2,3,5 -> cumulative 2,5,10
        let pool = [c("a", 2), c("b", 3), c("c", 5)];

        // r = 0.0 -> a (0 - 2 <= 0)
        let result = select(&pool, 1, &mut Scripted::new(&[0.0]));
        assert_eq!(ids(&result), vec!["a"]);

        // r = 2.0 -> a (2 - 2 == 0 crosses)
        let result = select(&pool, 1, &mut Scripted::new(&[0.2]));
        assert_eq!(ids(&result), vec!["a"]);

        // r = 4.0 -> b
        let result = select(&pool, 1, &mut Scripted::new(&[0.4]));
        assert_eq!(ids(&result), vec!["b"]);

        // r = 9.9 -> c
        let result = select(&pool, 1, &mut Scripted::new(&[0.99]));
        assert_eq!(ids(&result), vec!["c"]);
    }

    #[test]
    fn winner_is_removed_before_next_round() {
        // Round 1: r = 0.0 picks a. Round 2 pool is [b(3), c(5)], total 8;
        // r = 0.5 * 8 = 4 -> 4 - 3 = 1 > 0, 1 - 5 <= 0 -> c.
        let pool = [c("a", 2), c("b", 3), c("c", 5)];
        let result = select(&pool, 2, &mut Scripted::new(&[0.0, 0.5]));
        assert_eq!(ids(&result), vec!["a", "c"]);
    }

    #[test]
    fn rounding_overshoot_falls_back_to_last() {
        let pool = [c("a", 1), c("b", 1)];
        let result = select(&pool, 1, &mut Scripted::new(&[1.0]));
        assert_eq!(ids(&result), vec!["b"]);
    }

    #[test]
    fn seeded_draws_are_reproducible() {
        let pool: Vec<_> = (0..20).map(|i| c(&format!("p{i}"), i + 1)).collect();
        let a = select(&pool, 5, &mut RngSource::seeded(77));
        let b = select(&pool, 5, &mut RngSource::seeded(77));
        assert_eq!(a, b);
    }

    #[test]
    fn heavy_candidate_wins_about_eighty_percent() {
        // pool [{A,1},{B,1},{C,8}], winnerCount=2, 10 000 trials
        let pool = [c("a", 1), c("b", 1), c("c", 8)];
        let mut source = RngSource::seeded(2024);
        let mut first: HashMap<String, u32> = HashMap::new();
        for _ in 0..10_000 {
            let result = select(&pool, 2, &mut source);
            assert_eq!(result.len(), 2);
            assert_ne!(result[0].id, result[1].id);
            *first.entry(result[0].id.clone()).or_default() += 1;
        }
        let c_share = f64::from(first["c"]) / 10_000.0;
        assert!((c_share - 0.8).abs() < 0.03, "C first-pick share {c_share}");
        let a = f64::from(first["a"]);
        let b = f64::from(first["b"]);
        assert!((a - b).abs() / 10_000.0 < 0.03, "A={a} B={b}");
    }

    #[test]
    fn frequency_converges_to_weight_share() {
        let pool = [c("a", 1), c("b", 3), c("c", 6)];
        let mut source = RngSource::seeded(8);
        let trials = 20_000;
        let mut counts: HashMap<String, u32> = HashMap::new();
        for _ in 0..trials {
            let result = select(&pool, 1, &mut source);
            *counts.entry(result[0].id.clone()).or_default() += 1;
        }
        for (id, expected) in [("a", 0.1), ("b", 0.3), ("c", 0.6)] {
            let share = f64::from(counts[id]) / f64::from(trials);
            assert!((share - expected).abs() < 0.02, "{id}: {share} vs {expected}");
        }
    }

    #[test]
    fn equal_pair_unseeded_is_balanced() {
        let pool = [c("a", 1), c("b", 1)];
        let mut source = RngSource::from_os();
        let trials = 4_000;
        let a_wins = (0..trials)
            .filter(|_| select(&pool, 1, &mut source)[0].id == "a")
            .count();
        #[allow(clippy::cast_precision_loss)]
        let share = a_wins as f64 / f64::from(trials);
        assert!((share - 0.5).abs() < 0.05, "A share {share}");
    }
}
