//! Rolling time-window trim.
//!
//! The retained window is anchored to the freshest record present, not to
//! wall-clock time: the upstream feed routinely runs weeks stale, and an
//! anchor at "now" would silently empty the output whenever it stalls.

use chrono::{Datelike as _, NaiveDate};
use toronto_radar_models::TheftRecord;

/// Default trailing window length in months.
pub const WINDOW_MONTHS: u32 = 6;

/// Restricts `records` to the trailing `window_months` anchored at the
/// maximum `(year, month)` present.
///
/// The cutoff is the first of the anchor month minus `window_months`
/// 30-day months; records whose `(year, month)` falls before it are
/// dropped. Empty input is returned unchanged. Applying the trim to its
/// own output removes nothing further.
#[must_use]
pub fn trim_to_window(records: Vec<TheftRecord>, window_months: u32) -> Vec<TheftRecord> {
    let Some(latest) = records.iter().map(TheftRecord::year_month).max() else {
        return records;
    };
    let latest_year = latest / 100;
    let latest_month = latest % 100;

    let Some(anchor) = i32::try_from(latest_year)
        .ok()
        .zip(u32::try_from(latest_month).ok())
        .and_then(|(year, month)| NaiveDate::from_ymd_opt(year, month, 1))
    else {
        return records;
    };

    let cutoff = anchor - chrono::Duration::days(i64::from(window_months) * 30);
    let cutoff_ym = i64::from(cutoff.year()) * 100 + i64::from(cutoff.month());

    let before = records.len();
    let trimmed: Vec<TheftRecord> = records
        .into_iter()
        .filter(|record| record.year_month() >= cutoff_ym)
        .collect();

    log::info!(
        "window {}-{:02} to {latest_year}-{latest_month:02}: {} records outside",
        cutoff.year(),
        cutoff.month(),
        before - trimmed.len()
    );
    trimmed
}
