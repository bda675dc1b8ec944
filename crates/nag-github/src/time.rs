//! Timestamp decoding for feed payloads.

use chrono::{DateTime, Utc};

/// Parses a feed timestamp into UTC.
///
/// The platform emits RFC 3339 (`2024-03-01T09:00:00Z`); some proxied
/// deployments emit a numeric offset without a colon
/// (`2024-03-01T09:00:00.000+0000`), which RFC 3339 rejects.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|parsed| parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_zulu_suffix() {
        let parsed = parse_instant("2024-03-01T09:00:00Z").expect("should parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn parses_colonless_offset() {
        let parsed = parse_instant("2024-03-01T09:00:00.000+0000").expect("should parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn parses_offset_with_colon() {
        let parsed = parse_instant("2024-03-01T10:00:00+01:00").expect("should parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_instant("last tuesday").is_err());
        assert!(parse_instant("").is_err());
    }
}
