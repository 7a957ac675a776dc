//! Config-driven theft data source definition.
//!
//! [`SourceDefinition`] captures everything unique about one upstream
//! dataset in a serializable config struct: the query endpoint, paging,
//! and the [`FieldAliases`] table mapping each logical record attribute to
//! the upstream column names that have carried it across dataset versions.
//! A single generic pipeline handles all sources, eliminating per-dataset
//! boilerplate.

use serde::Deserialize;
use toronto_radar_models::TheftCategory;

// ── Top-level source definition ──────────────────────────────────────────

/// A complete, config-driven theft data source definition.
///
/// Loaded from TOML files at compile time and used as the sole source
/// implementation.
#[derive(Debug, Deserialize)]
pub struct SourceDefinition {
    /// Unique identifier (e.g., `"auto"`).
    pub id: String,
    /// Human-readable name (e.g., `"Auto Theft Open Data"`).
    pub name: String,
    /// Category discriminator stamped on every record from this source.
    pub category: TheftCategory,
    /// `FeatureServer` query URL.
    pub query_url: String,
    /// Records per page.
    pub page_size: u64,
    /// Output filename (e.g., `"auto_thefts.json"`).
    pub output_filename: String,
    /// Field name mappings for normalization.
    pub fields: FieldAliases,
}

impl SourceDefinition {
    /// Returns the unique source identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable source name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the category stamped on this source's records.
    #[must_use]
    pub const fn category(&self) -> TheftCategory {
        self.category
    }

    /// Returns the `FeatureServer` query URL.
    #[must_use]
    pub fn query_url(&self) -> &str {
        &self.query_url
    }

    /// Returns the configured page size.
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Returns the output filename for this source.
    #[must_use]
    pub fn output_filename(&self) -> &str {
        &self.output_filename
    }

    /// Returns the field alias table for this source.
    #[must_use]
    pub const fn fields(&self) -> &FieldAliases {
        &self.fields
    }
}

// ── Field aliases ────────────────────────────────────────────────────────

/// Maps each logical record attribute to the upstream column names that may
/// carry it, tried left to right. The upstream schema has no stability
/// guarantee — column names change between dataset versions — so every
/// attribute lookup goes through this table via [`resolve`].
#[derive(Debug, Deserialize)]
pub struct FieldAliases {
    /// Incident id columns.
    pub id: Vec<String>,
    /// Occurrence/report date columns (epoch ms or ISO strings).
    pub date: Vec<String>,
    /// Occurrence year columns.
    pub year: Vec<String>,
    /// Occurrence month columns (numbers or English month names).
    pub month: Vec<String>,
    /// Occurrence day columns.
    pub day: Vec<String>,
    /// Occurrence hour columns.
    pub hour: Vec<String>,
    /// Neighbourhood name columns.
    pub neighbourhood: Vec<String>,
    /// Premise type columns.
    pub premise: Vec<String>,
    /// Latitude columns (fallback when geometry is absent).
    pub lat: Vec<String>,
    /// Longitude columns (fallback when geometry is absent).
    pub lng: Vec<String>,
    /// Investigation status columns.
    pub status: Vec<String>,
}

/// Returns the first non-null value among `aliases`, tried left to right.
#[must_use]
pub fn resolve<'a>(
    attributes: &'a serde_json::Map<String, serde_json::Value>,
    aliases: &[String],
) -> Option<&'a serde_json::Value> {
    aliases
        .iter()
        .filter_map(|name| attributes.get(name))
        .find(|value| !value.is_null())
}

/// Parses a [`SourceDefinition`] from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or missing required fields.
pub fn parse_source_toml(toml_str: &str) -> Result<SourceDefinition, String> {
    toml::de::from_str(toml_str).map_err(|e| e.to_string())
}
