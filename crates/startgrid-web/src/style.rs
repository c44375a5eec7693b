#![forbid(unsafe_code)]

//! Computed-style parsing for grid measurement.

/// Leading numeric value of a CSS length, the way `parseFloat` reads it:
/// `"12.5px"` is `12.5`, `"10px 20px"` is `10`, `"normal"` is `None`.
#[must_use]
pub fn parse_css_length(value: &str) -> Option<f64> {
    let value = value.trim_start();
    let end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(value.len(), |(i, _)| i);
    value[..end].parse().ok().filter(|v: &f64| v.is_finite())
}

/// Resolve `(column_gap, row_gap)` from computed `gap`, `column-gap` and
/// `row-gap`.
///
/// The shorthand wins for columns when present; rows prefer `row-gap`, then
/// the shorthand, then whatever the column gap resolved to.
#[must_use]
pub fn resolve_gaps(gap: &str, column_gap: &str, row_gap: &str) -> (f64, f64) {
    let column = parse_css_length(first_non_empty(gap, column_gap)).unwrap_or(0.0);
    let row = parse_css_length(first_non_empty(row_gap, gap)).unwrap_or(column);
    (column, row)
}

fn first_non_empty<'a>(preferred: &'a str, fallback: &'a str) -> &'a str {
    if preferred.is_empty() {
        fallback
    } else {
        preferred
    }
}
