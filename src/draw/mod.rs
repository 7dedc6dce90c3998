//! Weighted drawing engine
//!
//! Picks a fixed number of distinct winners from a weighted pool using
//! iterative roulette removal: each round draws one candidate with
//! probability proportional to its weight among those still in the pool,
//! then removes it before the next round.
//!
//! # Architecture
//!
//! - [`Candidate`] / [`DrawRequest`]: the pool and the requested count
//! - [`UniformSource`]: injected `[0, 1)` randomness ([`RngSource`] adapts `rand`)
//! - [`select`]: the sampling algorithm itself, a total function

pub mod candidate;
pub mod engine;
pub mod source;

pub use candidate::{Candidate, DrawRequest, DrawResult};
pub use engine::select;
pub use source::{RngSource, UniformSource};
