//! Configuration validation
//!
//! Runs on the deserialized [`DrawConfig`] and collects every issue rather
//! than stopping at the first, so a single `slotdraw validate` run reports
//! everything wrong with a file.

use std::collections::HashSet;

use crate::config::loader::ConfigLimits;
use crate::config::schema::DrawConfig;
use crate::error::{Severity, ValidationIssue};

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns the result.
    pub fn validate(&mut self, config: &DrawConfig, limits: &ConfigLimits) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_winners(config);
        self.validate_pool(config, limits);
        self.validate_timing(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    fn validate_winners(&mut self, config: &DrawConfig) {
        if config.winners < 0 {
            self.add_error(
                "winners",
                &format!("winner count must be >= 0, got {}", config.winners),
            );
            return;
        }

        let eligible = config.pool.iter().filter(|e| e.weight > 0).count();
        let requested = usize::try_from(config.winners).unwrap_or(usize::MAX);
        if !config.pool.is_empty() && requested > eligible {
            self.add_warning(
                "winners",
                &format!(
                    "{requested} winners requested but only {eligible} candidates have tickets; \
                     the result will be truncated"
                ),
            );
        }
    }

    fn validate_pool(&mut self, config: &DrawConfig, limits: &ConfigLimits) {
        if config.pool.is_empty() {
            self.add_warning("pool", "pool is empty; the draw will have no winners");
            return;
        }

        if config.pool.len() > limits.max_candidates {
            self.add_error(
                "pool",
                &format!(
                    "pool has {} candidates, limit is {}",
                    config.pool.len(),
                    limits.max_candidates
                ),
            );
        }

        let mut seen = HashSet::new();
        for (i, entry) in config.pool.iter().enumerate() {
            let id = entry.resolved_id(i);
            if !seen.insert(id.clone()) {
                self.add_error(&format!("pool[{i}].id"), &format!("duplicate id '{id}'"));
            }
            if entry.name.trim().is_empty() {
                self.add_error(&format!("pool[{i}].name"), "name is empty");
            }
            if entry.weight < 0 {
                self.add_error(
                    &format!("pool[{i}].weight"),
                    &format!("weight must be >= 0, got {}", entry.weight),
                );
            }
        }

        if config.pool.iter().all(|e| e.weight == 0) {
            self.add_warning("pool", "every candidate has zero tickets; nobody can win");
        }
    }

    fn validate_timing(&mut self, config: &DrawConfig) {
        match config.timing() {
            Ok(timing) => {
                if let Err(e) = timing.validate() {
                    self.add_error("timing", &e.to_string());
                }
            }
            Err(e) => self.add_error("timing", &e.to_string()),
        }
    }

    /// Adds an error to the collection.
    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    /// Adds a warning to the collection.
    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}
