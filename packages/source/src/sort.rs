//! Client-side recency ordering for raw features.
//!
//! Server-side `orderByFields` is unreliable on large layers, so pages are
//! accumulated unordered and sorted here before normalization.

use crate::RawFeature;
use crate::parsing::{MIN_PLAUSIBLE_EPOCH_MS, coerce_i64, month_number};
use crate::source_def::{FieldAliases, resolve};

/// Sorts features newest-first.
///
/// The primary key is an alias-resolved epoch-millisecond date when one is
/// present and plausible; otherwise a synthetic key composed from year,
/// month, day, and hour, weighted so each term dominates the next. The
/// underlying sort is stable, so features with equal keys keep their
/// arrival order.
pub fn sort_by_recency(features: &mut [RawFeature], fields: &FieldAliases) {
    features.sort_by_key(|feature| recency_key(feature, fields));
}

fn recency_key(feature: &RawFeature, fields: &FieldAliases) -> i64 {
    let attributes = &feature.attributes;

    if let Some(ms) = resolve(attributes, &fields.date).and_then(serde_json::Value::as_f64)
        && ms > MIN_PLAUSIBLE_EPOCH_MS
    {
        #[allow(clippy::cast_possible_truncation)]
        let millis = ms as i64;
        return -millis;
    }

    let year = coerce_i64(resolve(attributes, &fields.year), 0);
    // Unknown month names count as 0 here: an unsortable month should not
    // promote a feature past well-dated ones.
    let month = match resolve(attributes, &fields.month) {
        Some(value) if value.is_number() => coerce_i64(Some(value), 0),
        Some(serde_json::Value::String(name)) => month_number(name).map_or(0, i64::from),
        _ => 0,
    };
    let day = coerce_i64(resolve(attributes, &fields.day), 0);
    let hour = coerce_i64(resolve(attributes, &fields.hour), 0);

    -(year * 1_000_000 + month * 10_000 + day * 100 + hour)
}
