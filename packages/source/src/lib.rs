#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Theft data fetching and normalization logic.
//!
//! Drives the upstream `ArcGIS` `FeatureServer` endpoints through an ordered
//! list of query strategies ([`query`]), accumulates raw features with
//! paginated fetching and retry ([`arcgis`], [`retry`]), orders them by
//! recency client-side ([`sort`]), and reconciles the shifting upstream
//! column names into canonical [`toronto_radar_models::TheftRecord`]s
//! ([`normalize`]).

pub mod arcgis;
pub mod normalize;
pub mod parsing;
pub mod query;
pub mod registry;
pub mod retry;
pub mod sort;
pub mod source_def;

use serde::Deserialize;

/// User agent sent with every upstream request.
pub const USER_AGENT: &str = "TorontoRadar/2.0";

/// Per-request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Errors that can occur during data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The server reported a failure inside an otherwise successful
    /// response body (`ArcGIS` embeds `{"error": {...}}` in HTTP 200s).
    #[error("ArcGIS error {code}: {message}")]
    Api {
        /// Upstream error code.
        code: i64,
        /// Upstream error message.
        message: String,
    },
}

/// Configuration for fetching data from a source.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Maximum number of records to fetch (for testing).
    pub limit: Option<u64>,
    /// Trailing window length in months, used to build date-filter
    /// candidates.
    pub window_months: u32,
}

/// One raw upstream feature, exactly as the query endpoint returns it.
///
/// Ephemeral: consumed by [`normalize`] and never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFeature {
    /// Column name → scalar value. Column names vary between dataset
    /// versions; see [`source_def::FieldAliases`].
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    /// Point geometry, when the server returns one.
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

/// Point geometry attached to a [`RawFeature`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Geometry {
    /// Longitude in the requested spatial reference (WGS84).
    #[serde(default)]
    pub x: Option<f64>,
    /// Latitude in the requested spatial reference (WGS84).
    #[serde(default)]
    pub y: Option<f64>,
}

/// Builds the shared HTTP client used for all upstream requests.
///
/// # Errors
///
/// Returns [`SourceError::Http`] if the TLS backend fails to initialize.
pub fn build_client() -> Result<reqwest::Client, SourceError> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?)
}
