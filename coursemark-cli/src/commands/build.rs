//! Build command implementation.

use super::run_pipeline;
use anyhow::{Context, Result};
use coursemark_core::{Config, ProcessResult};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BuildOutput<'a> {
    generated_at: String,
    #[serde(flatten)]
    result: &'a ProcessResult,
}

/// Run the pipeline and write the full result as JSON
pub fn build_content(config: &Config, output: Option<&Path>, pretty: bool) -> Result<()> {
    let result = run_pipeline(config)?;
    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.output_path());

    let payload = BuildOutput {
        generated_at: chrono::Utc::now().to_rfc3339(),
        result: &result,
    };
    let json = if pretty {
        serde_json::to_string_pretty(&payload)?
    } else {
        serde_json::to_string(&payload)?
    };

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    fs::write(&output_path, json)
        .with_context(|| format!("Failed to write {:?}", output_path))?;

    tracing::info!(
        "Wrote {} modules and {} courses to {:?} ({} errors, {} warnings)",
        result.modules.len(),
        result.courses.len(),
        output_path,
        result.error_count(),
        result.warning_count()
    );
    Ok(())
}
