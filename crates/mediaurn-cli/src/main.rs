//! Mediaurn CLI - Resolve media URNs from the command line
//!
//! Features:
//! - URN resolution to a playback source
//! - Resource inspection (filtering, DRM, tokens, selection)
//! - Browser environment emulation

use clap::{Parser, Subcommand};
use mediaurn_core::{PlaybackEnvironment, ResolverConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

/// Mediaurn CLI - Media URN resolver
#[derive(Parser)]
#[command(name = "mediaurn")]
#[command(version)]
#[command(about = "Resolve media URNs into playback sources", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    format: String,

    /// Resolver configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Select resources as a Safari-family browser would
    #[arg(long, global = true)]
    safari: bool,

    /// The player cannot play adaptive streams behind a token
    #[arg(long, global = true)]
    no_tokenized_adaptive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a URN into a playback source
    Resolve {
        /// Media URN, e.g. urn:rts:video:10313496
        urn: String,

        /// Disable all trackers for the source
        #[arg(long)]
        disable_trackers: bool,
    },

    /// List the resources of a URN and how they are ranked
    Inspect {
        /// Media URN
        urn: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so the output stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    mediaurn_core::init();

    let config = match &cli.config {
        Some(path) => ResolverConfig::from_json_file(path)?,
        None => ResolverConfig::default(),
    };
    let environment = PlaybackEnvironment {
        any_safari: cli.safari,
        tokenized_adaptive_streaming: !cli.no_tokenized_adaptive,
    };

    match cli.command {
        Commands::Resolve { urn, disable_trackers } => {
            let resolved = commands::resolve(config, environment, &urn, disable_trackers, &cli.format).await?;
            if !resolved {
                std::process::exit(1);
            }
        }
        Commands::Inspect { urn } => {
            commands::inspect(config, environment, &urn, &cli.format).await?;
        }
    }

    Ok(())
}

/// Log level used when `RUST_LOG` is not set
fn log_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}
