#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the theft data scraper.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use toronto_radar_ingest::{SyncOptions, all_sources, enabled_sources, run_all, window};
use toronto_radar_source::source_def::SourceDefinition;

/// Default directory the frontend reads its data files from.
const DEFAULT_OUTPUT_DIR: &str = "public/data";

#[derive(Parser)]
#[command(name = "toronto_radar_ingest", about = "Toronto Police theft data scraper")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync data from all configured sources
    SyncAll {
        /// Maximum number of records per source (for testing)
        #[arg(long)]
        limit: Option<u64>,
        /// Comma-separated list of source IDs to sync (overrides
        /// `TORONTO_RADAR_SOURCES` env var)
        #[arg(long)]
        sources: Option<String>,
        /// Directory to write output files to
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
        /// Trailing window length in months
        #[arg(long, default_value_t = window::WINDOW_MONTHS)]
        window_months: u32,
    },
    /// Sync data from a specific source
    Sync {
        /// Source identifier (e.g., "auto")
        source: String,
        /// Maximum number of records to fetch
        #[arg(long)]
        limit: Option<u64>,
        /// Directory to write output files to
        #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
        /// Trailing window length in months
        #[arg(long, default_value_t = window::WINDOW_MONTHS)]
        window_months: u32,
    },
    /// List all configured data sources
    Sources,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::SyncAll {
        limit: None,
        sources: None,
        output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        window_months: window::WINDOW_MONTHS,
    });

    let start = Instant::now();

    let total = match command {
        Commands::Sources => {
            let sources = all_sources();
            println!("{:<10} NAME", "ID");
            println!("{}", "-".repeat(40));
            for source in &sources {
                println!("{:<10} {}", source.id(), source.name());
            }
            return Ok(());
        }
        Commands::Sync {
            source,
            limit,
            output_dir,
            window_months,
        } => {
            let sources = all_sources();
            let def = sources
                .iter()
                .find(|s| s.id() == source)
                .ok_or_else(|| format!("Unknown source: {source}"))?;
            let options = SyncOptions {
                output_dir,
                limit,
                window_months,
            };
            run_all(std::slice::from_ref(def), &options).await?
        }
        Commands::SyncAll {
            limit,
            sources,
            output_dir,
            window_months,
        } => {
            let sources = enabled_sources(sources);
            log::info!(
                "Syncing {} source(s): {}",
                sources.len(),
                sources
                    .iter()
                    .map(SourceDefinition::id)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            let options = SyncOptions {
                output_dir,
                limit,
                window_months,
            };
            run_all(&sources, &options).await?
        }
    };

    let elapsed = start.elapsed();
    log::info!("Done: {total} records in {:.1}s", elapsed.as_secs_f64());

    if total == 0 {
        log::error!("Zero records saved across all sources; upstream API may be down");
        std::process::exit(1);
    }

    Ok(())
}
