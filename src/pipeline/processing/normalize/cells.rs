use chrono::NaiveDate;

use crate::error::{FeedError, Result};

/// Date formats seen across the feeds: NYT uses ISO dates, NYC Health uses
/// US-style month/day/year.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y"];

pub fn parse_date(feed: &str, column: &str, raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| {
            FeedError::schema(
                feed,
                format!("column '{}' has unparseable date '{}'", column, raw),
            )
        })
}

/// Parse a count cell. Blank and NA-style cells are absent, not zero.
/// Whole-valued floats ("12.0") are accepted since some exports write
/// integer columns that way.
pub fn parse_count(feed: &str, column: &str, raw: &str) -> Result<Option<i64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("null")
    {
        return Ok(None);
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Ok(Some(v));
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
            Ok(Some(v as i64))
        }
        _ => Err(FeedError::schema(
            feed,
            format!("column '{}' has non-integer value '{}'", column, raw),
        )),
    }
}

/// Cell at `idx`, or empty when the row is short.
pub fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Blank identifier cells become `None`.
pub fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
