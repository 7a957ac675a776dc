#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical theft record types shared across the pipeline.
//!
//! Every data source produces [`TheftRecord`] values after normalization.
//! Substitution defaults for missing source fields are named constants here
//! so the fallback policy is auditable next to the schema it applies to.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Substituted for `neighbourhood`, `premise_type`, and `status` when every
/// source alias is absent or null.
pub const DEFAULT_LABEL: &str = "Unknown";

/// Substituted for `month` when the source value is absent, an unrecognized
/// month name, or a number outside 1..=12.
pub const DEFAULT_MONTH: u32 = 1;

/// Substituted for `day` when every source alias is absent or uncoercible.
pub const DEFAULT_DAY: u32 = 1;

/// Substituted for `hour` when every source alias is absent or uncoercible.
/// Midday, so defaulted records don't pile up at midnight in hourly charts.
pub const DEFAULT_HOUR: u32 = 12;

/// The theft dataset a record came from.
///
/// Serialized in lowercase both as the JSON discriminator and as the
/// record-id prefix, so raw ids can never collide across categories.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TheftCategory {
    /// Auto theft open data
    Auto,
    /// Bicycle theft open data
    Bike,
}

/// A theft incident normalized to the canonical schema.
///
/// This is the persisted unit: the output files contain arrays of these,
/// camelCase-keyed, with the category under the legacy `type` key. Records
/// are immutable once created — the window trimmer filters but never
/// mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TheftRecord {
    /// `"{category}-{rawId}"` — globally unique within a category's file.
    pub id: String,
    /// Which dataset this record came from.
    #[serde(rename = "type")]
    pub category: TheftCategory,
    /// Occurrence date, `YYYY-MM-DD`, always a valid calendar date.
    pub date: String,
    /// Occurrence year.
    pub year: i32,
    /// Occurrence month, 1..=12.
    pub month: u32,
    /// Occurrence day of month.
    pub day: u32,
    /// Occurrence hour, 0..=23.
    pub hour: u32,
    /// Neighbourhood name, trimmed; [`DEFAULT_LABEL`] when missing.
    pub neighbourhood: String,
    /// Premise type (e.g. "Outside", "Apartment"), trimmed;
    /// [`DEFAULT_LABEL`] when missing.
    pub premise_type: String,
    /// Latitude (WGS84), rounded to 6 decimals.
    pub lat: f64,
    /// Longitude (WGS84), rounded to 6 decimals.
    pub lng: f64,
    /// Investigation status, trimmed; [`DEFAULT_LABEL`] when missing.
    pub status: String,
}

impl TheftRecord {
    /// Linear `year*100 + month` combination used for recency comparisons
    /// by the window trimmer.
    #[must_use]
    pub fn year_month(&self) -> i64 {
        i64::from(self.year) * 100 + i64::from(self.month)
    }
}
