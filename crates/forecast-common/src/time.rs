//! Timestamp helpers for run metadata and chart axes.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// ISO-8601 UTC format used for every timestamp the services emit.
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Format a timestamp as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_iso(dt: &DateTime<Utc>) -> String {
    dt.format(ISO_FORMAT).to_string()
}

pub fn now_iso() -> String {
    format_iso(&Utc::now())
}

/// Compact run version label, e.g. `202401151200`.
pub fn version_stamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%d%H%M").to_string()
}

/// Parse the timestamp spellings found in station and model exports.
///
/// Values without an offset are taken as UTC; a bare date is midnight.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 6] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%MZ",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-15T12:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T12:00:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 12:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T12:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 12:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-15"),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_format_iso() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 5, 6, 7, 8).unwrap();
        assert_eq!(format_iso(&dt), "2024-03-05T06:07:08Z");
        assert_eq!(version_stamp(&dt), "202403050607");
    }
}
