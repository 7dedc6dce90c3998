//! `slotdraw` - Weighted prize drawing with a slot-machine reveal
//!
//! This library provides a weighted draw engine (sampling without
//! replacement), a phased reveal controller that animates the draw, and
//! the configuration, persistence, and observability layers around them.

pub mod cli;
pub mod config;
pub mod draw;
pub mod error;
pub mod observability;
pub mod reveal;
pub mod store;
