//! Verify content health and emit diagnostics.

use super::run_pipeline;
use anyhow::{bail, Result};
use coursemark_core::{Config, ContentError};
use coursemark_types::ErrorCategory;
use serde::Serialize;

#[derive(Serialize)]
struct VerificationSummary<'a> {
    modules: usize,
    courses: usize,
    errors: usize,
    warnings: usize,
    production: usize,
    wip: usize,
    diagnostics: &'a [ContentError],
}

/// Run the pipeline without writing output and surface diagnostics.
///
/// Fails when any error is found, or any warning with `fail_on_warnings`.
pub fn verify_content(config: &Config, json: bool) -> Result<()> {
    let result = run_pipeline(config)?;
    let diagnostics = &result.errors;

    let in_category = |category: ErrorCategory| {
        diagnostics
            .iter()
            .filter(|e| e.category == Some(category))
            .count()
    };
    let summary = VerificationSummary {
        modules: result.modules.len(),
        courses: result.courses.len(),
        errors: result.error_count(),
        warnings: result.warning_count(),
        production: in_category(ErrorCategory::Production),
        wip: in_category(ErrorCategory::Wip),
        diagnostics,
    };

    if json {
        let payload = serde_json::to_string_pretty(&summary)?;
        println!("{}", payload);
    } else {
        println!(
            "Verification complete: {} modules, {} courses, {} errors, {} warnings",
            summary.modules, summary.courses, summary.errors, summary.warnings
        );
        println!(
            "By tier: {} production, {} wip",
            summary.production, summary.wip
        );
        for error in diagnostics {
            println!("{}", error);
        }
    }

    if summary.errors > 0 {
        bail!("Verification failed with {} errors", summary.errors);
    }
    if config.fail_on_warnings && summary.warnings > 0 {
        bail!("Verification failed with {} warnings", summary.warnings);
    }
    Ok(())
}
