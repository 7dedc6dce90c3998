//! `slotdraw validate`: check configuration files without drawing.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::ConfigLoader;
use crate::error::{ConfigError, Severity, SlotDrawError, ValidationIssue};

/// Outcome of validating one file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// File that was checked
    pub file: String,
    /// Whether the file can be used for a draw
    pub valid: bool,
    /// Blocking problems
    pub errors: Vec<String>,
    /// Non-blocking problems
    pub warnings: Vec<String>,
}

/// Runs `slotdraw validate`.
///
/// Every file is checked even after a failure.
///
/// # Errors
///
/// Returns the first file's error if any file fails (or, with `--strict`,
/// has warnings).
pub fn run(args: &ValidateArgs) -> Result<(), SlotDrawError> {
    let loader = ConfigLoader::with_defaults();
    let mut reports = Vec::with_capacity(args.files.len());
    let mut first_error: Option<ConfigError> = None;

    for path in &args.files {
        info!(file = %path.display(), "validating configuration");
        let (report, error) = check_file(&loader, path, args.strict);
        if first_error.is_none() {
            first_error = error;
        }
        reports.push(report);
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Human => {
            for report in &reports {
                print!("{}", format_report(report));
            }
        }
    }

    first_error.map_or(Ok(()), |e| Err(e.into()))
}

/// Validates one file. Returns the report and, if the file is rejected,
/// the error to exit with.
pub fn check_file(
    loader: &ConfigLoader,
    path: &Path,
    strict: bool,
) -> (FileReport, Option<ConfigError>) {
    let file = path.display().to_string();

    match loader.load(path) {
        Ok(result) => {
            let warnings: Vec<String> = result.warnings.iter().map(ToString::to_string).collect();
            for warning in &warnings {
                warn!(file = %file, "{warning}");
            }

            if strict && !warnings.is_empty() {
                let issues = result
                    .warnings
                    .into_iter()
                    .map(|w| ValidationIssue {
                        path: w.location.unwrap_or_default(),
                        message: w.message,
                        severity: Severity::Error,
                    })
                    .collect();
                let report = FileReport {
                    file: file.clone(),
                    valid: false,
                    errors: warnings,
                    warnings: Vec::new(),
                };
                return (
                    report,
                    Some(ConfigError::ValidationError {
                        path: file,
                        errors: issues,
                    }),
                );
            }

            info!(file = %file, "configuration valid");
            (
                FileReport {
                    file,
                    valid: true,
                    errors: Vec::new(),
                    warnings,
                },
                None,
            )
        }
        Err(e) => {
            let errors = match &e {
                ConfigError::ValidationError { errors, .. } => {
                    errors.iter().map(ToString::to_string).collect()
                }
                other => vec![other.to_string()],
            };
            (
                FileReport {
                    file,
                    valid: false,
                    errors,
                    warnings: Vec::new(),
                },
                Some(e),
            )
        }
    }
}

/// Human-readable rendering of one report.
#[must_use]
pub fn format_report(report: &FileReport) -> String {
    let mut out = format!(
        "{} {}\n",
        if report.valid { "ok  " } else { "FAIL" },
        report.file
    );
    for error in &report.errors {
        out.push_str("  ");
        out.push_str(error);
        out.push('\n');
    }
    for warning in &report.warnings {
        out.push_str("  ");
        out.push_str(warning);
        out.push('\n');
    }
    out
}
