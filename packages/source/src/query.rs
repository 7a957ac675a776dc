//! Query strategy builder and server-side field discovery.
//!
//! The upstream rejects some filter shapes depending on dataset version,
//! so each fetch walks an ordered list of candidate `where` clauses until
//! one yields records. Ordering is decreasing specificity: epoch-date
//! filters, then the year filter, then `1=1` as the unconditional last
//! resort. Keeping the candidates as data (rather than nested error
//! handling) makes the fallback order testable on its own.

use chrono::{DateTime, Datelike as _, Utc};
use reqwest::Client;

use crate::arcgis::QueryResponse;
use crate::{SourceError, retry};

/// Filter columns assumed to exist when field discovery fails or the layer
/// reports nothing.
const DEFAULT_FILTER_FIELDS: &[&str] = &["OCC_DATE", "REPORT_DATE", "OCC_YEAR"];

/// One candidate `where` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereClause {
    /// Expression passed as the `where` query parameter.
    pub expression: String,
    /// Short label for log lines.
    pub label: String,
}

/// Builds the ordered filter candidates for one dataset.
///
/// Date and year clauses are only emitted for columns present in
/// `available_fields`; an empty set falls back to
/// [`DEFAULT_FILTER_FIELDS`] so the full candidate list is still produced.
/// The final `1=1` candidate is always present and always valid.
#[must_use]
pub fn build_where_clauses(
    available_fields: &[String],
    cutoff: DateTime<Utc>,
) -> Vec<WhereClause> {
    let known: Vec<&str> = if available_fields.is_empty() {
        DEFAULT_FILTER_FIELDS.to_vec()
    } else {
        available_fields.iter().map(String::as_str).collect()
    };

    let cutoff_ms = cutoff.timestamp_millis();
    let mut clauses = Vec::new();

    for column in ["OCC_DATE", "REPORT_DATE"] {
        if known.contains(&column) {
            clauses.push(WhereClause {
                expression: format!("{column} >= {cutoff_ms}"),
                label: format!("{column} epoch"),
            });
        }
    }

    if known.contains(&"OCC_YEAR") {
        clauses.push(WhereClause {
            expression: format!("OCC_YEAR >= '{}'", cutoff.year()),
            label: format!("year >= {}", cutoff.year()),
        });
    }

    clauses.push(WhereClause {
        expression: "1=1".to_string(),
        label: "unfiltered".to_string(),
    });

    clauses
}

/// Probes the server for available attribute column names.
///
/// Prefers the attribute keys of a single sampled feature; falls back to
/// the advertised `fields` list for empty layers. Any failure degrades to
/// an empty list so the caller assumes the conservative default set.
#[allow(clippy::future_not_send)]
pub async fn discover_fields(client: &Client, query_url: &str) -> Vec<String> {
    match probe_fields(client, query_url).await {
        Ok(fields) => fields,
        Err(e) => {
            log::warn!("  field discovery failed: {e}");
            Vec::new()
        }
    }
}

#[allow(clippy::future_not_send)]
async fn probe_fields(client: &Client, query_url: &str) -> Result<Vec<String>, SourceError> {
    let body = retry::send_json(|| {
        client.get(query_url).query(&[
            ("where", "1=1"),
            ("outFields", "*"),
            ("f", "json"),
            ("resultRecordCount", "1"),
            ("resultOffset", "0"),
        ])
    })
    .await?;
    let response: QueryResponse = serde_json::from_value(body)?;

    if let Some(feature) = response.features.first() {
        return Ok(feature.attributes.keys().cloned().collect());
    }
    Ok(response.fields.into_iter().map(|f| f.name).collect())
}
