//! Shared validation helpers for inbound HTTP parameters.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;

use crate::domain::Error;

/// Parse a date-range parameter.
///
/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date, which is read
/// as midnight UTC.
///
/// # Errors
///
/// Returns a `validation_failed` error naming `field` when the value parses
/// as neither form.
pub(crate) fn parse_date_param(field: &'static str, value: &str) -> Result<DateTime<Utc>, Error> {
    let trimmed = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(invalid_date_error(field, value))
}

fn invalid_date_error(field: &'static str, value: &str) -> Error {
    Error::validation_failed(format!(
        "The {field} must be a date (YYYY-MM-DD) or an RFC 3339 timestamp."
    ))
    .with_details(json!({
        "errors": { field: [format!("{field} could not be parsed as a date")] },
        "value": value,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    fn bare_dates_parse_to_midnight_utc() {
        let parsed = parse_date_param("from_date", "2024-08-19").expect("date parses");
        let expected = Utc
            .with_ymd_and_hms(2024, 8, 19, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    fn rfc3339_timestamps_parse_with_offset() {
        let parsed =
            parse_date_param("to_date", "2024-08-19T10:32:14+02:00").expect("timestamp parses");
        let expected = Utc
            .with_ymd_and_hms(2024, 8, 19, 8, 32, 14)
            .single()
            .expect("valid timestamp");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case("next tuesday")]
    #[case("2024-13-40")]
    #[case("")]
    fn unparseable_values_are_validation_failures(#[case] raw: &str) {
        let error = parse_date_param("from_date", raw).expect_err("must fail");
        assert_eq!(error.code(), crate::domain::ErrorCode::ValidationFailed);
        let details = error.details().expect("details present");
        assert!(details["errors"]["from_date"].is_array());
    }
}
