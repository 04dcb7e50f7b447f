//! # coursemark CLI
//!
//! Command-line interface for the coursemark content pipeline.

mod commands;

use clap::{Parser, Subcommand};
use coursemark_core::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coursemark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Content directory; overrides the config file
    #[arg(long, env = "COURSEMARK_CONTENT")]
    content: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the content and report every error and warning
    Verify {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Write flattened modules, courses and errors as JSON
    Build {
        /// Output file (defaults to the configured output)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },

    /// List external URLs referenced by the content
    Urls {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays parseable
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = commands::load_config(&cli.config, cli.content.as_deref())?;

    match cli.command {
        Commands::Verify { json } => commands::verify_content(&config, json),
        Commands::Build { output, pretty } => {
            commands::build_content(&config, output.as_deref(), pretty)
        }
        Commands::Urls { json } => commands::list_urls(&config, json),
    }
}
