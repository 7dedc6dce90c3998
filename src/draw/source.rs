//! Pluggable randomness for the drawing engine.
//!
//! The engine only needs uniform values in `[0, 1)`. Injecting the source
//! keeps draws reproducible under a fixed seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A generator of uniform values in `[0, 1)`.
pub trait UniformSource {
    /// Returns the next value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

/// Adapts any [`rand::Rng`] into a [`UniformSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(R);

impl<R: Rng> RngSource<R> {
    /// Wraps an existing generator.
    #[must_use]
    pub const fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngSource<StdRng> {
    /// Deterministic source: the same seed always yields the same draws.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Unseeded source backed by the operating system's entropy.
    #[must_use]
    pub fn from_os() -> Self {
        Self(StdRng::from_os_rng())
    }
}

impl<R: Rng> UniformSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}
