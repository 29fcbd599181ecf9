//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::{DateTime, Utc};

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a timestamp as a human date, e.g. "January 5, 2026".
///
/// Usage in templates: `{{ order.created_at|full_date }}`
#[askama::filter_fn]
pub fn full_date(value: &DateTime<Utc>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_full_date(value))
}

/// Render a timestamp as "Month day, year" without zero-padding the day.
fn format_full_date(value: &DateTime<Utc>) -> String {
    value.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_full_date() {
        let ts = Utc.with_ymd_and_hms(2016, 8, 6, 9, 25, 0).unwrap();
        assert_eq!(format_full_date(&ts), "August 6, 2016");
    }
}
