//! Paginated `ArcGIS` `FeatureServer` fetcher.
//!
//! Walks the ordered query candidates from [`crate::query`] and, for the
//! winning candidate, accumulates every page until the server reports
//! exhaustion or a safety cap is hit. Offsets advance by the number of
//! records actually received, so the server sees a gap-free monotonic
//! offset sequence.

use reqwest::Client;
use serde::Deserialize;

use crate::query::{WhereClause, build_where_clauses, discover_fields};
use crate::source_def::SourceDefinition;
use crate::{FetchOptions, RawFeature, SourceError, retry};

/// Hard cap on accumulated records per query candidate, bounding memory
/// and time against runaway pagination.
pub const MAX_FEATURES: usize = 100_000;

/// Fixed output spatial reference (WGS84 decimal degrees).
const OUT_SPATIAL_REFERENCE: &str = "4326";

/// Response body of a `FeatureServer` query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// Raw features in this page.
    #[serde(default)]
    pub features: Vec<RawFeature>,
    /// True when more records exist beyond this page.
    #[serde(default)]
    pub exceeded_transfer_limit: bool,
    /// Layer field descriptors (consulted when the layer yields no sample
    /// feature during discovery).
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
}

/// One layer field descriptor.
#[derive(Debug, Deserialize)]
pub struct FieldInfo {
    /// Column name.
    pub name: String,
}

/// Fetches all raw features for one source.
///
/// Tries each filter candidate in order; the first that yields records
/// wins. A candidate that fails past retries or yields nothing is logged
/// and abandoned. When every candidate is exhausted the source degrades to
/// an empty result set, never an error.
#[allow(clippy::future_not_send)]
pub async fn fetch_features(
    client: &Client,
    def: &SourceDefinition,
    options: &FetchOptions,
) -> Vec<RawFeature> {
    log::info!("{}: fetching...", def.name());

    let available = discover_fields(client, def.query_url()).await;
    if available.is_empty() {
        log::warn!(
            "{}: field discovery came back empty, assuming default filter columns",
            def.name()
        );
    } else {
        log::info!("{}: {} fields discovered", def.name(), available.len());
    }

    let cutoff = chrono::Utc::now() - chrono::Duration::days(i64::from(options.window_months) * 30);

    for clause in build_where_clauses(&available, cutoff) {
        log::info!("{}: trying {}", def.name(), clause.label);
        match fetch_all_pages(client, def, &clause, options.limit).await {
            Ok(features) if features.is_empty() => {
                log::info!("{}: no records via {}", def.name(), clause.label);
            }
            Ok(features) => {
                log::info!(
                    "{}: {} features via {}",
                    def.name(),
                    features.len(),
                    clause.label
                );
                return features;
            }
            Err(e) => {
                log::warn!("{}: {} failed: {e}", def.name(), clause.label);
            }
        }
    }

    log::error!("{}: all query strategies failed", def.name());
    Vec::new()
}

/// Accumulates every page for one filter candidate.
#[allow(clippy::future_not_send)]
async fn fetch_all_pages(
    client: &Client,
    def: &SourceDefinition,
    clause: &WhereClause,
    limit: Option<u64>,
) -> Result<Vec<RawFeature>, SourceError> {
    let mut features: Vec<RawFeature> = Vec::new();
    let mut offset: u64 = 0;
    let fetch_limit = limit.unwrap_or(u64::MAX);
    let page_size = def.page_size();

    loop {
        let fetched = u64::try_from(features.len()).unwrap_or(u64::MAX);
        let remaining = fetch_limit.saturating_sub(fetched);
        if remaining == 0 {
            break;
        }
        let page_limit = remaining.min(page_size);

        let page = offset / page_size + 1;
        let count_param = page_limit.to_string();
        let offset_param = offset.to_string();
        let body = retry::send_json(|| {
            client.get(def.query_url()).query(&[
                ("where", clause.expression.as_str()),
                ("outFields", "*"),
                ("outSR", OUT_SPATIAL_REFERENCE),
                ("f", "json"),
                ("resultRecordCount", count_param.as_str()),
                ("resultOffset", offset_param.as_str()),
            ])
        })
        .await?;
        let response: QueryResponse = serde_json::from_value(body)?;

        let count = u64::try_from(response.features.len()).unwrap_or(u64::MAX);
        log::info!("{}: page {page} (offset={offset}): {count} records", def.name());
        if count == 0 {
            break;
        }

        features.extend(response.features);
        offset += count;

        if features.len() >= MAX_FEATURES {
            log::warn!("{}: hit {MAX_FEATURES} record cap, stopping", def.name());
            break;
        }

        // exceededTransferLimit is the canonical more-pages signal; a short
        // page alone is unreliable because the server silently caps results
        // at its own maxRecordCount.
        if !response.exceeded_transfer_limit && count < page_limit {
            break;
        }
    }

    Ok(features)
}
