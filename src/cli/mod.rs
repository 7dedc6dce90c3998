//! Command-line interface
//!
//! Argument definitions and command handlers for the `slotdraw` binary.

pub mod args;
pub mod commands;
pub mod render;
