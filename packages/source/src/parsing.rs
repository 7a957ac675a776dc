//! Shared parsing utilities for theft data sources.
//!
//! Month-name resolution, lenient scalar coercion, and the occurrence-date
//! derivation chain used during normalization.

use chrono::{DateTime, Datelike as _, NaiveDate};
use toronto_radar_models::DEFAULT_MONTH;

/// Minimum plausible millisecond-epoch timestamp. Values at or below this
/// are sentinels (zeroes, small placeholders), not real timestamps.
pub const MIN_PLAUSIBLE_EPOCH_MS: f64 = 1_000_000_000.0;

/// Full English month names as the upstream `OCC_MONTH` column spells them.
/// Matching is case-sensitive; abbreviations are not recognized.
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Resolves a full English month name to its 1..=12 number.
#[must_use]
pub fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|&m| m == name)
        .and_then(|i| u32::try_from(i + 1).ok())
}

/// Parses an upstream month value into 1..=12.
///
/// Numbers are truncated to integer; strings are resolved as full English
/// month names. Anything unrecognized or out of range takes
/// [`DEFAULT_MONTH`].
#[must_use]
pub fn parse_month(raw: Option<&serde_json::Value>) -> u32 {
    match raw {
        Some(value) if value.is_number() => {
            #[allow(clippy::cast_possible_truncation)]
            let truncated = value.as_f64().map(|n| n as i64);
            truncated
                .filter(|n| (1..=12).contains(n))
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(DEFAULT_MONTH)
        }
        Some(serde_json::Value::String(name)) => month_number(name).unwrap_or(DEFAULT_MONTH),
        _ => DEFAULT_MONTH,
    }
}

/// Coerces an upstream scalar to an integer, accepting numbers (truncated)
/// and numeric strings. Anything else takes `default`.
#[must_use]
pub fn coerce_i64(value: Option<&serde_json::Value>, default: i64) -> i64 {
    let Some(value) = value else {
        return default;
    };
    #[allow(clippy::cast_possible_truncation)]
    let from_number = value.as_i64().or_else(|| value.as_f64().map(|n| n as i64));
    from_number
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .unwrap_or(default)
}

/// Coerces an upstream scalar to a float, accepting numbers and numeric
/// strings. Anything else takes `0.0`, the invalid-coordinate sentinel.
#[must_use]
pub fn coerce_f64(value: Option<&serde_json::Value>) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .unwrap_or(0.0)
}

/// Rounds a coordinate to 6 decimal places (about 0.1 m of precision).
#[must_use]
pub fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Derives the canonical `YYYY-MM-DD` occurrence date.
///
/// Fallback chain:
/// 1. a numeric raw value above [`MIN_PLAUSIBLE_EPOCH_MS`] is interpreted
///    as milliseconds since the Unix epoch;
/// 2. a string of at least 10 characters contributes its first 10
///    characters verbatim (ISO-prefixed upstream formats);
/// 3. otherwise the resolved year/month/day fields are composed, when they
///    form a valid calendar date;
/// 4. otherwise the current processing year and month with the day fixed
///    to the 1st.
#[must_use]
pub fn derive_date(
    raw: Option<&serde_json::Value>,
    year: i32,
    month: u32,
    day: u32,
    today: NaiveDate,
) -> String {
    if let Some(value) = raw {
        if let Some(ms) = value.as_f64()
            && ms > MIN_PLAUSIBLE_EPOCH_MS
        {
            #[allow(clippy::cast_possible_truncation)]
            let millis = ms as i64;
            if let Some(dt) = DateTime::from_timestamp_millis(millis) {
                return dt.date_naive().format("%Y-%m-%d").to_string();
            }
        }
        if let Some(s) = value.as_str()
            && let Some(prefix) = s.get(..10)
        {
            return prefix.to_string();
        }
    }
    NaiveDate::from_ymd_opt(year, month, day).map_or_else(
        || format!("{:04}-{:02}-01", today.year(), today.month()),
        |date| date.format("%Y-%m-%d").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 20).unwrap()
    }

    #[test]
    fn month_names_are_case_sensitive() {
        assert_eq!(month_number("March"), Some(3));
        assert_eq!(month_number("march"), None);
        assert_eq!(month_number("Mar"), None);
    }

    #[test]
    fn parse_month_truncates_numbers() {
        assert_eq!(parse_month(Some(&serde_json::json!(3.9))), 3);
        assert_eq!(parse_month(Some(&serde_json::json!(12))), 12);
    }

    #[test]
    fn parse_month_defaults_out_of_range_numbers() {
        assert_eq!(parse_month(Some(&serde_json::json!(0))), DEFAULT_MONTH);
        assert_eq!(parse_month(Some(&serde_json::json!(13))), DEFAULT_MONTH);
    }

    #[test]
    fn parse_month_resolves_names() {
        assert_eq!(parse_month(Some(&serde_json::json!("September"))), 9);
        assert_eq!(parse_month(Some(&serde_json::json!("Septembre"))), DEFAULT_MONTH);
    }

    #[test]
    fn parse_month_defaults_other_types() {
        assert_eq!(parse_month(None), DEFAULT_MONTH);
        assert_eq!(parse_month(Some(&serde_json::json!(true))), DEFAULT_MONTH);
    }

    #[test]
    fn coerces_numeric_strings() {
        assert_eq!(coerce_i64(Some(&serde_json::json!(" 2024 ")), 0), 2024);
        assert!((coerce_f64(Some(&serde_json::json!("43.65"))) - 43.65).abs() < f64::EPSILON);
    }

    #[test]
    fn coercion_failures_take_defaults() {
        assert_eq!(coerce_i64(Some(&serde_json::json!("Monday")), 1), 1);
        assert_eq!(coerce_i64(None, 7), 7);
        assert!(coerce_f64(Some(&serde_json::json!("n/a"))).abs() < f64::EPSILON);
    }

    #[test]
    fn derives_date_from_epoch_ms() {
        // 2024-03-15T12:00:00Z
        let raw = serde_json::json!(1_710_504_000_000.0_f64);
        assert_eq!(derive_date(Some(&raw), 0, 1, 1, today()), "2024-03-15");
    }

    #[test]
    fn small_numeric_dates_are_not_epochs() {
        let raw = serde_json::json!(0);
        assert_eq!(derive_date(Some(&raw), 2024, 3, 15, today()), "2024-03-15");
    }

    #[test]
    fn derives_date_from_iso_prefix() {
        let raw = serde_json::json!("2023-11-02T08:30:00");
        assert_eq!(derive_date(Some(&raw), 0, 1, 1, today()), "2023-11-02");
    }

    #[test]
    fn short_strings_fall_through_to_components() {
        let raw = serde_json::json!("2023");
        assert_eq!(derive_date(Some(&raw), 2024, 6, 9, today()), "2024-06-09");
    }

    #[test]
    fn synthesizes_date_from_components() {
        assert_eq!(derive_date(None, 2024, 2, 29, today()), "2024-02-29");
    }

    #[test]
    fn invalid_components_fall_back_to_processing_month() {
        // 2023 was not a leap year
        assert_eq!(derive_date(None, 2023, 2, 29, today()), "2025-07-01");
        assert_eq!(derive_date(None, 2024, 1, 0, today()), "2025-07-01");
    }

    #[test]
    fn rounds_to_six_decimals() {
        assert!((round6(43.651_234_567) - 43.651_235).abs() < 1e-9);
        assert!((round6(-79.383_000_4) - -79.383_0).abs() < 1e-9);
    }
}
