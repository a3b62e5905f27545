//! Header and cell normalization plus lenient numeric coercion.
//!
//! None of these functions fail: anything that cannot be interpreted comes
//! back as `None`, and callers decide whether absence is fatal.

/// Lower-cases, trims and replaces spaces with underscores.
///
/// Idempotent: `normalize_header(normalize_header(h)) == normalize_header(h)`.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// Trims a raw cell, treating empty and whitespace-only text as absent.
pub fn clean_cell(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

fn sanitize_number(raw: &str) -> Option<String> {
    let text = clean_cell(raw)?;
    let sanitized: String = text.chars().filter(|c| *c != '%' && *c != ',').collect();
    let sanitized = sanitized.trim();
    if sanitized.is_empty() {
        None
    } else {
        Some(sanitized.to_string())
    }
}

/// Parses a decimal value, tolerating `%` and thousands separators.
///
/// `"85%"` → `85.0`, `"1,234"` → `1234.0`, `""` → `None`.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let value: f64 = sanitize_number(raw)?.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Parses an integer, accepting decimal-looking input by truncation (`"3.0"` → `3`).
pub fn parse_integer(raw: &str) -> Option<i64> {
    let value = parse_decimal(raw)?;
    let truncated = value.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}
