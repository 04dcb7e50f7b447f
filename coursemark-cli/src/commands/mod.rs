//! CLI command implementations.

pub mod build;
pub mod urls;
pub mod verify;

pub use build::build_content;
pub use urls::list_urls;
pub use verify::verify_content;

use anyhow::{bail, Context, Result};
use coursemark_core::{process_content, Config, FileSnapshot, ProcessResult};
use std::path::Path;

/// Resolve configuration from `--content` or the config file
pub fn load_config(config_path: &Path, content: Option<&Path>) -> Result<Config> {
    if let Some(dir) = content {
        return Ok(Config::for_content_dir(dir));
    }
    if !config_path.exists() {
        bail!(
            "No configuration found at {:?}; pass --content <DIR> or create one",
            config_path
        );
    }
    tracing::debug!("Loading config from {:?}", config_path);
    Config::from_file(config_path).context("Failed to load configuration")
}

/// Load the content directory and run one pass over it
pub fn run_pipeline(config: &Config) -> Result<ProcessResult> {
    let content_dir = config.content_dir();
    let snapshot = FileSnapshot::from_dir(&content_dir, &config.ignore_patterns)
        .with_context(|| format!("Failed to load content from {:?}", content_dir))?;
    Ok(process_content(&snapshot))
}
