//! Field reconciliation from raw features to canonical theft records.
//!
//! Each raw feature maps to zero or one [`TheftRecord`]: features with
//! zero or out-of-region coordinates are dropped and counted, everything
//! else is resolved through the alias table with per-field defaults from
//! `toronto_radar_models`.

use chrono::{Datelike as _, NaiveDate, Utc};
use toronto_radar_models::{DEFAULT_DAY, DEFAULT_HOUR, DEFAULT_LABEL, TheftRecord};

use crate::parsing::{coerce_f64, coerce_i64, derive_date, parse_month, round6};
use crate::source_def::{SourceDefinition, resolve};
use crate::{Geometry, RawFeature};

/// Plausible latitude range for the served region. Points outside are
/// corrupt or placeholder data, not incidents.
const LAT_RANGE: std::ops::RangeInclusive<f64> = 41.0..=57.0;

/// Plausible longitude range for the served region.
const LNG_RANGE: std::ops::RangeInclusive<f64> = -95.0..=-73.0;

/// Result of normalizing one batch of raw features.
#[derive(Debug, Default)]
pub struct NormalizeOutcome {
    /// Records that passed validation, in input order.
    pub records: Vec<TheftRecord>,
    /// Features dropped for zero or out-of-region coordinates.
    pub bad_coords: u64,
}

/// Normalizes a batch of raw features into canonical records.
#[must_use]
pub fn normalize_features(features: &[RawFeature], def: &SourceDefinition) -> NormalizeOutcome {
    let today = Utc::now().date_naive();
    let mut outcome = NormalizeOutcome::default();

    for feature in features {
        match normalize_feature(feature, def, today, outcome.records.len()) {
            Some(record) => outcome.records.push(record),
            None => outcome.bad_coords += 1,
        }
    }

    log::info!(
        "{}: {} valid, {} bad coords",
        def.name(),
        outcome.records.len(),
        outcome.bad_coords
    );
    outcome
}

/// Maps one raw feature to a canonical record, or `None` when its
/// coordinates disqualify it.
fn normalize_feature(
    feature: &RawFeature,
    def: &SourceDefinition,
    today: NaiveDate,
    index: usize,
) -> Option<TheftRecord> {
    let attributes = &feature.attributes;
    let fields = def.fields();

    // Geometry coordinates win; attribute aliases are the fallback when
    // either axis is missing.
    let (lat, lng) = match feature.geometry {
        Some(Geometry {
            x: Some(x),
            y: Some(y),
        }) => (y, x),
        _ => (
            coerce_f64(resolve(attributes, &fields.lat)),
            coerce_f64(resolve(attributes, &fields.lng)),
        ),
    };

    if (lat == 0.0 && lng == 0.0) || !LAT_RANGE.contains(&lat) || !LNG_RANGE.contains(&lng) {
        return None;
    }

    let year = resolve_year(attributes, &fields.year, today);
    let month = parse_month(resolve(attributes, &fields.month));
    let day = resolve_component(attributes, &fields.day, DEFAULT_DAY);
    let hour = resolve_component(attributes, &fields.hour, DEFAULT_HOUR).min(23);

    let date = derive_date(resolve(attributes, &fields.date), year, month, day, today);

    let raw_id = resolve(attributes, &fields.id).map_or_else(|| index.to_string(), display_value);

    Some(TheftRecord {
        id: format!("{}-{raw_id}", def.category()),
        category: def.category(),
        date,
        year,
        month,
        day,
        hour,
        neighbourhood: resolve_label(attributes, &fields.neighbourhood),
        premise_type: resolve_label(attributes, &fields.premise),
        lat: round6(lat),
        lng: round6(lng),
        status: resolve_label(attributes, &fields.status),
    })
}

fn resolve_year(
    attributes: &serde_json::Map<String, serde_json::Value>,
    aliases: &[String],
    today: NaiveDate,
) -> i32 {
    let value = coerce_i64(resolve(attributes, aliases), i64::from(today.year()));
    i32::try_from(value).unwrap_or_else(|_| today.year())
}

fn resolve_component(
    attributes: &serde_json::Map<String, serde_json::Value>,
    aliases: &[String],
    default: u32,
) -> u32 {
    let value = coerce_i64(resolve(attributes, aliases), i64::from(default));
    u32::try_from(value).unwrap_or(default)
}

/// Renders a scalar as a plain string, without JSON quoting.
fn display_value(value: &serde_json::Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), str::to_string)
}

fn resolve_label(
    attributes: &serde_json::Map<String, serde_json::Value>,
    aliases: &[String],
) -> String {
    resolve(attributes, aliases).map_or_else(
        || DEFAULT_LABEL.to_string(),
        |value| display_value(value).trim().to_string(),
    )
}

#[cfg(test)]
mod tests {
    use toronto_radar_models::TheftCategory;

    use super::*;
    use crate::source_def::parse_source_toml;

    fn bike_def() -> SourceDefinition {
        parse_source_toml(include_str!("../sources/bike.toml")).unwrap()
    }

    fn feature(json: serde_json::Value) -> RawFeature {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn normalizes_attribute_only_feature() {
        let features = [feature(serde_json::json!({
            "attributes": {
                "OCC_YEAR": 2024,
                "OCC_MONTH": "March",
                "OCC_DAY": 15,
                "LAT_WGS84": 43.65,
                "LONG_WGS84": -79.38,
                "EVENT_UNIQUE_ID": "GO-5"
            }
        }))];
        let outcome = normalize_features(&features, &bike_def());
        assert_eq!(outcome.bad_coords, 0);

        let record = &outcome.records[0];
        assert_eq!(record.id, "bike-GO-5");
        assert_eq!(record.category, TheftCategory::Bike);
        assert_eq!(record.year, 2024);
        assert_eq!(record.month, 3);
        assert_eq!(record.day, 15);
        assert_eq!(record.date, "2024-03-15");
        assert_eq!(record.hour, DEFAULT_HOUR);
        assert!((record.lat - 43.65).abs() < f64::EPSILON);
        assert!((record.lng - -79.38).abs() < f64::EPSILON);
        assert_eq!(record.neighbourhood, DEFAULT_LABEL);
        assert_eq!(record.status, DEFAULT_LABEL);
    }

    #[test]
    fn zero_coordinates_are_discarded_and_counted() {
        let features = [feature(serde_json::json!({
            "attributes": {"EVENT_UNIQUE_ID": "GO-1", "LAT_WGS84": 0.0, "LONG_WGS84": 0.0}
        }))];
        let outcome = normalize_features(&features, &bike_def());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.bad_coords, 1);
    }

    #[test]
    fn out_of_region_coordinates_are_discarded() {
        // Paris is a real point, but not one this feed can produce.
        let features = [
            feature(serde_json::json!({
                "attributes": {"LAT_WGS84": 48.85, "LONG_WGS84": 2.35}
            })),
            feature(serde_json::json!({
                "attributes": {"LAT_WGS84": 60.1, "LONG_WGS84": -79.38}
            })),
        ];
        let outcome = normalize_features(&features, &bike_def());
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.bad_coords, 2);
    }

    #[test]
    fn geometry_wins_over_attribute_coordinates() {
        let features = [feature(serde_json::json!({
            "attributes": {"EVENT_UNIQUE_ID": "GO-2", "LAT_WGS84": 42.0, "LONG_WGS84": -80.0},
            "geometry": {"x": -79.4, "y": 43.7}
        }))];
        let outcome = normalize_features(&features, &bike_def());
        let record = &outcome.records[0];
        assert!((record.lat - 43.7).abs() < f64::EPSILON);
        assert!((record.lng - -79.4).abs() < f64::EPSILON);
    }

    #[test]
    fn half_missing_geometry_falls_back_to_attributes() {
        let features = [feature(serde_json::json!({
            "attributes": {"EVENT_UNIQUE_ID": "GO-3", "LAT_WGS84": "43.651234567", "LONG_WGS84": "-79.383000400"},
            "geometry": {"x": -79.4}
        }))];
        let outcome = normalize_features(&features, &bike_def());
        let record = &outcome.records[0];
        assert!((record.lat - 43.651_235).abs() < 1e-9);
        assert!((record.lng - -79.383_000).abs() < 1e-9);
    }

    #[test]
    fn epoch_date_wins_over_components() {
        let features = [feature(serde_json::json!({
            "attributes": {
                "EVENT_UNIQUE_ID": "GO-4",
                "OCC_DATE": 1_710_504_000_000_i64,
                "OCC_YEAR": 1999, "OCC_MONTH": 1, "OCC_DAY": 1,
                "LAT_WGS84": 43.65, "LONG_WGS84": -79.38
            }
        }))];
        let outcome = normalize_features(&features, &bike_def());
        assert_eq!(outcome.records[0].date, "2024-03-15");
    }

    #[test]
    fn labels_are_trimmed_and_defaulted() {
        let features = [feature(serde_json::json!({
            "attributes": {
                "EVENT_UNIQUE_ID": "GO-6",
                "NEIGHBOURHOOD_140": "  Trinity-Bellwoods (81) ",
                "PREMISES_TYPE": null,
                "STATUS": "  ",
                "LAT_WGS84": 43.65, "LONG_WGS84": -79.38
            }
        }))];
        let outcome = normalize_features(&features, &bike_def());
        let record = &outcome.records[0];
        assert_eq!(record.neighbourhood, "Trinity-Bellwoods (81)");
        assert_eq!(record.premise_type, DEFAULT_LABEL);
        assert_eq!(record.status, "");
    }

    #[test]
    fn numeric_ids_are_rendered_without_quoting() {
        let features = [feature(serde_json::json!({
            "attributes": {"OBJECTID": 1234, "LAT_WGS84": 43.65, "LONG_WGS84": -79.38}
        }))];
        let outcome = normalize_features(&features, &bike_def());
        assert_eq!(outcome.records[0].id, "bike-1234");
    }

    #[test]
    fn missing_id_falls_back_to_record_index() {
        let features = [
            feature(serde_json::json!({
                "attributes": {"EVENT_UNIQUE_ID": "GO-7", "LAT_WGS84": 43.65, "LONG_WGS84": -79.38}
            })),
            feature(serde_json::json!({
                "attributes": {"LAT_WGS84": 43.66, "LONG_WGS84": -79.39}
            })),
        ];
        let outcome = normalize_features(&features, &bike_def());
        assert_eq!(outcome.records[1].id, "bike-1");
    }

    #[test]
    fn month_invariant_holds_for_garbage_months() {
        for month in [
            serde_json::json!(0),
            serde_json::json!(13),
            serde_json::json!("Pluviôse"),
            serde_json::json!(null),
        ] {
            let features = [feature(serde_json::json!({
                "attributes": {
                    "EVENT_UNIQUE_ID": "GO-8",
                    "OCC_MONTH": month,
                    "LAT_WGS84": 43.65, "LONG_WGS84": -79.38
                }
            }))];
            let outcome = normalize_features(&features, &bike_def());
            let record = &outcome.records[0];
            assert!((1..=12).contains(&record.month));
        }
    }

    #[test]
    fn hour_is_clamped_to_day_range() {
        let features = [feature(serde_json::json!({
            "attributes": {
                "EVENT_UNIQUE_ID": "GO-9",
                "OCC_HOUR": 99,
                "LAT_WGS84": 43.65, "LONG_WGS84": -79.38
            }
        }))];
        let outcome = normalize_features(&features, &bike_def());
        assert_eq!(outcome.records[0].hour, 23);
    }

    #[test]
    fn day_of_week_alias_cannot_coerce_and_defaults() {
        // OCC_DOW carries weekday names on some dataset versions.
        let features = [feature(serde_json::json!({
            "attributes": {
                "EVENT_UNIQUE_ID": "GO-10",
                "OCC_DOW": "Monday",
                "LAT_WGS84": 43.65, "LONG_WGS84": -79.38
            }
        }))];
        let outcome = normalize_features(&features, &bike_def());
        assert_eq!(outcome.records[0].day, DEFAULT_DAY);
    }
}
