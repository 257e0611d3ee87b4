// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Calendar key (`YYYY-MM-DD`) for a UTC date.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` calendar key.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_key_round_trip() {
        let now = Utc.with_ymd_and_hms(2025, 1, 9, 23, 59, 59).unwrap();
        let key = date_key(now.date_naive());
        assert_eq!(key, "2025-01-09");
        assert_eq!(parse_date_key(&key), Some(now.date_naive()));
        assert_eq!(parse_date_key("2025-13-01"), None);
    }

    #[test]
    fn test_rfc3339_has_z_suffix() {
        let now = Utc.with_ymd_and_hms(2025, 1, 9, 8, 0, 0).unwrap();
        assert_eq!(format_utc_rfc3339(now), "2025-01-09T08:00:00.000Z");
    }
}
