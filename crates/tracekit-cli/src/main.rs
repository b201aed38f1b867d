use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracekit_config::Config;
use tracekit_core::tier::TierKey;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// tracekit - batch provenance reconstruction
#[derive(Debug, Parser)]
#[command(name = "tracekit")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the config file (defaults to ./tracekit.toml when present)
    #[arg(short, long, env = "TRACEKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error, or a directive list)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reconstruct the full traceability view of a batch document
    Reconstruct {
        /// Batch document (JSON)
        input: PathBuf,

        /// Include engine counters alongside the view
        #[arg(long)]
        metrics: bool,
    },

    /// Print roll-up statistics for a batch or one of its tiers
    Stats {
        /// Batch document (JSON)
        input: PathBuf,

        /// Restrict the scope to one tier (FARM, SUPPLIER, MANUFACTURER, BRAND, UNKNOWN)
        #[arg(long)]
        tier: Option<TierKey>,
    },

    /// List tier groups with their event ids
    Tiers {
        /// Batch document (JSON)
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = Config::discover(cli.config.as_deref())?;
    let pretty = cli.pretty || config.output.pretty;

    let output = match &cli.command {
        Commands::Reconstruct { input, metrics } => {
            commands::reconstruct(input, &config, *metrics)?
        }
        Commands::Stats { input, tier } => commands::stats(input, &config, *tier)?,
        Commands::Tiers { input } => commands::tiers(input, &config)?,
    };

    commands::print_json(&output, pretty)
}

///
/// TESTS
///
