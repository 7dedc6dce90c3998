//! Phased reveal controller
//!
//! Drives the slot-machine animation through
//! `idle → countdown → scrolling → settling → complete` and runs the
//! weighted draw at the moment `complete` is entered.
//!
//! # Architecture
//!
//! - [`Phase`] / [`PhaseState`]: the value published on the display signal
//! - [`RevealTiming`]: countdown length, scroll deceleration, settle pause
//! - [`RevealRun`]: pure, clock-free step machine for one run
//! - [`RevealController`]: owns the single timer chain of the current run,
//!   restart and teardown semantics

pub mod controller;
pub mod run;
pub mod state;
pub mod timing;

pub use controller::RevealController;
pub use run::{RevealRun, Step};
pub use state::{Phase, PhaseState};
pub use timing::RevealTiming;
