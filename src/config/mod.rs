//! Draw configuration
//!
//! Loads and validates YAML files describing a candidate pool, the number
//! of winners, and optional reveal timing.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning};
pub use schema::{CandidateEntry, DrawConfig, TimingConfig};
pub use validation::{ValidationResult, Validator};
