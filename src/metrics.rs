//! Classification of CSV columns into schema fields and free-form metrics.

use crate::normalize::normalize_header;

/// Text columns with a fixed meaning.
pub const IDENTITY_FIELDS: [&str; 3] = ["airline_iata", "category", "travel_class"];

/// Numeric columns mapped onto ranking row fields.
pub const WELL_KNOWN_NUMERIC_FIELDS: [&str; 7] = [
    "leaderboard_rank",
    "leaderboard_score",
    "avg_rating",
    "review_count",
    "positive_count",
    "negative_count",
    "positive_ratio",
];

/// Returns `true` if `column` maps to a fixed ranking field rather than a metric.
pub fn is_well_known(column: &str) -> bool {
    IDENTITY_FIELDS.contains(&column) || WELL_KNOWN_NUMERIC_FIELDS.contains(&column)
}

/// Returns every header that is not a well-known field, in header order.
pub fn detect_metric_columns<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    headers
        .iter()
        .map(|h| normalize_header(h.as_ref()))
        .filter(|h| !h.is_empty() && !is_well_known(h))
        .collect()
}
