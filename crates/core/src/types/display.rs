//! Date formatting for list and detail screens.

use chrono::{DateTime, NaiveDate, TimeZone};

/// Timestamp layout used across both applications (`05/03/2025, 02:07 PM`).
pub const DATETIME_FORMAT: &str = "%d/%m/%Y, %I:%M %p";

/// Date-only layout (`05/03/2025`).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Format a timestamp in its own offset.
#[must_use]
pub fn format_datetime<Tz>(value: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    value.format(DATETIME_FORMAT).to_string()
}

#[must_use]
pub fn format_date(value: NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

/// Value for an `<input type="datetime-local">` field.
#[must_use]
pub fn to_datetime_local<Tz>(value: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    value.format("%Y-%m-%dT%H:%M").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    #[test]
    fn test_format_datetime_twelve_hour() {
        let ts = DateTime::<FixedOffset>::parse_from_rfc3339("2025-03-05T14:07:00+07:00").unwrap();
        assert_eq!(format_datetime(&ts), "05/03/2025, 02:07 PM");

        let ts = DateTime::<FixedOffset>::parse_from_rfc3339("2025-12-31T00:30:00Z").unwrap();
        assert_eq!(format_datetime(&ts), "31/12/2025, 12:30 AM");
    }

    #[test]
    fn test_datetime_local() {
        let ts = DateTime::<FixedOffset>::parse_from_rfc3339("2025-03-05T14:07:00+07:00").unwrap();
        assert_eq!(to_datetime_local(&ts), "2025-03-05T14:07");
    }
}
