//! List external URLs for a link checker.

use super::run_pipeline;
use anyhow::Result;
use coursemark_core::Config;

pub fn list_urls(config: &Config, json: bool) -> Result<()> {
    let result = run_pipeline(config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.urls_to_validate)?);
        return Ok(());
    }

    for url in &result.urls_to_validate {
        let location = match url.line {
            Some(line) => format!("{}:{}", url.file, line),
            None => url.file.clone(),
        };
        println!("{}\t{}\t{}", url.url, location, url.label);
    }
    Ok(())
}
