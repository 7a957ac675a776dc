#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for scraping Toronto Police theft open data into flat JSON
//! files for the frontend.
//!
//! Each source runs the full pipeline sequentially — fetch, client-side
//! sort, normalize, window trim, write — and sources are isolated from one
//! another: a source that fails still gets an (empty) output file, and
//! only an all-sources total of zero records is treated as a run failure.

pub mod window;
pub mod writer;

use std::path::PathBuf;
use std::time::Instant;

use toronto_radar_source::arcgis::fetch_features;
use toronto_radar_source::normalize::normalize_features;
use toronto_radar_source::registry;
use toronto_radar_source::sort::sort_by_recency;
use toronto_radar_source::source_def::SourceDefinition;
use toronto_radar_source::{FetchOptions, SourceError};

/// Errors that can occur during an ingest run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Source-level failure (HTTP client construction).
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Options controlling a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Directory the output files are written to.
    pub output_dir: PathBuf,
    /// Maximum number of records to fetch per source (for testing).
    pub limit: Option<u64>,
    /// Trailing window length in months.
    pub window_months: u32,
}

/// Returns all configured data sources from the TOML registry.
#[must_use]
pub fn all_sources() -> Vec<SourceDefinition> {
    registry::all_sources()
}

/// Returns the sources to sync, filtered by the `--sources` CLI flag or
/// the `TORONTO_RADAR_SOURCES` environment variable. If neither is set,
/// all sources are returned.
#[must_use]
pub fn enabled_sources(cli_filter: Option<String>) -> Vec<SourceDefinition> {
    let filter = cli_filter.or_else(|| std::env::var("TORONTO_RADAR_SOURCES").ok());

    let all = all_sources();

    let Some(filter_str) = filter else {
        return all;
    };

    let ids: Vec<&str> = filter_str.split(',').map(str::trim).collect();

    let filtered: Vec<SourceDefinition> =
        all.into_iter().filter(|s| ids.contains(&s.id())).collect();

    if filtered.is_empty() {
        log::warn!(
            "No matching sources found for filter {:?}. Available: {}",
            ids,
            all_sources()
                .iter()
                .map(|s| s.id().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    filtered
}

/// Fetches, sorts, normalizes, trims, and writes one source. Returns the
/// number of records written.
///
/// # Errors
///
/// Returns [`IngestError`] if serializing or writing the output file
/// fails. Fetch-level failures never surface here — the fetcher degrades
/// to an empty feature set instead.
pub async fn sync_source(
    client: &reqwest::Client,
    def: &SourceDefinition,
    options: &SyncOptions,
) -> Result<u64, IngestError> {
    let start = Instant::now();
    log::info!("Syncing source: {} ({})", def.name(), def.id());

    let fetch_options = FetchOptions {
        limit: options.limit,
        window_months: options.window_months,
    };
    let mut raw = fetch_features(client, def, &fetch_options).await;
    sort_by_recency(&mut raw, def.fields());

    let outcome = normalize_features(&raw, def);
    let records = window::trim_to_window(outcome.records, options.window_months);
    writer::write_records(&records, &options.output_dir, def.output_filename())?;

    log::info!(
        "{}: {} records in {:.1}s",
        def.name(),
        records.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(u64::try_from(records.len()).unwrap_or(u64::MAX))
}

/// Syncs every source sequentially with per-source failure isolation.
///
/// A source that fails still gets its output file written, empty, so
/// downstream consumers never see a missing file. Returns the total
/// record count across all sources.
///
/// # Errors
///
/// Returns [`IngestError`] only if the shared HTTP client cannot be
/// constructed.
pub async fn run_all(
    sources: &[SourceDefinition],
    options: &SyncOptions,
) -> Result<u64, IngestError> {
    let client = toronto_radar_source::build_client()?;
    let mut total = 0u64;

    for def in sources {
        match sync_source(&client, def, options).await {
            Ok(count) => total += count,
            Err(e) => {
                log::error!("Failed to sync {}: {e}", def.id());
                if let Err(write_err) =
                    writer::write_records(&[], &options.output_dir, def.output_filename())
                {
                    log::error!("{}: failed to write empty output: {write_err}", def.id());
                }
            }
        }
    }

    Ok(total)
}
