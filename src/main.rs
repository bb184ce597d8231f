//! Channel-Harvest main entry point
//!
//! This is the command-line interface for the Channel-Harvest identifier
//! harvester.

use anyhow::Context;
use channel_harvest::config::load_or_default;
use channel_harvest::listing::{DEFAULT_TOP, MAX_TOP};
use channel_harvest::{
    harvest_to_file, Category, Concurrency, CountryCode, ListingSource, Metric, RunParameters,
};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Channel-Harvest: ranked channel identifier harvester
///
/// Reads a ranked listing of channels, visits every listed channel and
/// records its identifier. The identifiers of a run are written to a single
/// JSON file named after the run parameters and start time.
#[derive(Parser, Debug)]
#[command(name = "channel-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Harvest channel identifiers from ranked listings", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Harvest the top channels of a category
    Category {
        /// The category to harvest
        #[arg(short, long, value_parser = Category::from_str)]
        category: Category,

        /// The ranking metric (mostsubscribed, ms, mostviewed, mv)
        #[arg(short, long, value_parser = Metric::from_str)]
        metric: Metric,

        /// Number of channels resolved concurrently (1, 5, 10, 15, 20, 25)
        #[arg(short = 'n', long = "num-threads", visible_alias = "nt", default_value = "10", value_parser = Concurrency::from_str)]
        num_threads: Concurrency,
    },

    /// Harvest the top channels of a country
    Country {
        /// ISO-3166 alpha-2 country code
        #[arg(long, visible_alias = "co", value_parser = CountryCode::from_str)]
        country: CountryCode,

        /// The ranking metric (mostsubscribed, ms, mostviewed, mv)
        #[arg(short, long, value_parser = Metric::from_str)]
        metric: Metric,

        /// Number of channels resolved concurrently (1, 5, 10, 15, 20, 25)
        #[arg(short = 'n', long = "num-threads", visible_alias = "nt", default_value = "10", value_parser = Concurrency::from_str)]
        num_threads: Concurrency,

        /// Only resolve the top N listed channels
        #[arg(short, long, default_value_t = DEFAULT_TOP, value_parser = clap::value_parser!(u16).range(1..=MAX_TOP as i64))]
        top: u16,
    },
}

impl Command {
    fn into_parameters(self) -> channel_harvest::Result<RunParameters> {
        match self {
            Command::Category {
                category,
                metric,
                num_threads,
            } => Ok(RunParameters {
                source: ListingSource::Category(category),
                metric,
                concurrency: num_threads,
            }),
            Command::Country {
                country,
                metric,
                num_threads,
                top,
            } => Ok(RunParameters {
                source: ListingSource::country(country, top)?,
                metric,
                concurrency: num_threads,
            }),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    if let Some(path) = &cli.config {
        tracing::info!("Configuration loaded from: {}", path.display());
    }

    let params = cli.command.into_parameters()?;
    handle_run(&config, &params).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("channel_harvest=info,warn"),
            1 => EnvFilter::new("channel_harvest=debug,info"),
            2 => EnvFilter::new("channel_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Runs the harvest and writes its artifact
///
/// The artifact is written even when the listing could not be loaded or
/// every link failed.
async fn handle_run(
    config: &channel_harvest::Config,
    params: &RunParameters,
) -> anyhow::Result<()> {
    let started = Local::now();
    tracing::info!("Started | {}", started.format("%I:%M:%S%P"));
    tracing::info!("{}", params);

    let path = harvest_to_file(config, params, &started)
        .await
        .context("Harvest failed")?;

    tracing::info!(
        "Finished | {} | {}",
        Local::now().format("%I:%M:%S%P"),
        path.display()
    );

    Ok(())
}
