use chrono::{DateTime, NaiveDateTime, Utc};
use std::borrow::Cow;

/// Offset-carrying layouts tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Layouts without an offset; these are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses an ISO-8601 timestamp into UTC.
///
/// A trailing `Z` designates UTC. Explicit offsets are converted to UTC and
/// timestamps without an offset are taken to already be UTC.
///
/// Returns `None` for empty input or anything that does not parse. Callers
/// rely on this never failing loudly: a malformed timestamp only blanks the
/// one field it belongs to.
///
/// # Examples
///
/// ```
/// use meteoalarm::util::parse_timestamp;
///
/// let utc = parse_timestamp("2025-02-04T10:45:01Z").unwrap();
/// let shifted = parse_timestamp("2025-02-04T12:45:01+02:00").unwrap();
/// assert_eq!(utc, shifted);
///
/// assert!(parse_timestamp("tomorrow-ish").is_none());
/// ```
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized: Cow<'_, str> = match trimmed.strip_suffix(['Z', 'z']) {
        Some(stripped) => Cow::Owned(format!("{stripped}+00:00")),
        None => Cow::Borrowed(trimmed),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(naive.and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_trailing_z_is_utc() {
        assert_eq!(
            parse_timestamp("2025-02-05T10:36:06Z"),
            Some(utc(2025, 2, 5, 10, 36, 6))
        );
    }

    #[test]
    fn test_explicit_offset_converted_to_utc() {
        assert_eq!(
            parse_timestamp("2025-02-05T12:36:06+02:00"),
            Some(utc(2025, 2, 5, 10, 36, 6))
        );
        assert_eq!(
            parse_timestamp("2025-02-05T10:36:06+00:00"),
            Some(utc(2025, 2, 5, 10, 36, 6))
        );
    }

    #[test]
    fn test_space_separator_accepted() {
        assert_eq!(
            parse_timestamp("2025-02-05 10:36:06+00:00"),
            Some(utc(2025, 2, 5, 10, 36, 6))
        );
    }

    #[test]
    fn test_minute_precision_accepted() {
        assert_eq!(
            parse_timestamp("2025-02-05T12:36+02:00"),
            Some(utc(2025, 2, 5, 10, 36, 0))
        );
        assert_eq!(
            parse_timestamp("2025-02-05 10:36Z"),
            Some(utc(2025, 2, 5, 10, 36, 0))
        );
        assert_eq!(
            parse_timestamp("2025-02-05T10:36"),
            Some(utc(2025, 2, 5, 10, 36, 0))
        );
    }

    #[test]
    fn test_naive_timestamp_taken_as_utc() {
        assert_eq!(
            parse_timestamp("2025-02-05T10:36:06"),
            Some(utc(2025, 2, 5, 10, 36, 6))
        );
    }

    #[test]
    fn test_fractional_seconds() {
        let parsed = parse_timestamp("2025-02-05T10:36:06.250Z").unwrap();
        assert_eq!(parsed.timestamp(), utc(2025, 2, 5, 10, 36, 6).timestamp());
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert_eq!(
            parse_timestamp("  2025-02-05T10:36:06Z\n"),
            Some(utc(2025, 2, 5, 10, 36, 6))
        );
    }

    #[test]
    fn test_garbage_and_empty_are_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("not-a-date"), None);
        assert_eq!(parse_timestamp("2025-13-45T99:99:99Z"), None);
        assert_eq!(parse_timestamp("Z"), None);
    }
}
