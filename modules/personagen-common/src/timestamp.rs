//! Timestamp canonicalization.
//!
//! Every platform reports post times in its own shape: Instagram and LinkedIn
//! emit ISO-8601 with a trailing `Z`, Facebook emits ISO-8601 with a numeric
//! offset and no colon, X still uses the classic `Wed Oct 11 12:00:00 +0000
//! 2023` form. Everything is normalized to one canonical representation:
//! UTC, millisecond precision, trailing `Z`.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::TimestampFormatError;

/// Canonical output shape: `2024-01-01T12:00:00.000Z`.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Accepted source formats, tried in order; first match wins.
const ACCEPTED_FORMATS: &[&str] = &[
    // ISO-8601 with fractional seconds and offset
    "%Y-%m-%dT%H:%M:%S%.f%z",
    // ISO-8601 without fractional seconds
    "%Y-%m-%dT%H:%M:%S%z",
    // Classic microblog format (X `created_at`)
    "%a %b %d %H:%M:%S %z %Y",
];

/// Trailing numeric offset without a colon, e.g. `+0000`.
static OFFSET_NO_COLON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([+-]\d{2})(\d{2})$").unwrap());

pub fn format_canonical(dt: &DateTime<Utc>) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

/// Parse a source-native timestamp string into a UTC instant.
///
/// Normalizes `Z` to `+0000` and inserts the colon into offsets like `+0530`
/// so every accepted format is offset-based, then tries the formats in order.
pub fn canonicalize(raw: &str) -> Result<DateTime<Utc>, TimestampFormatError> {
    let trimmed = raw.trim();

    let normalized = if let Some(stripped) = trimmed.strip_suffix('Z') {
        format!("{stripped}+0000")
    } else {
        OFFSET_NO_COLON.replace(trimmed, "$1:$2").into_owned()
    };

    for fmt in ACCEPTED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    Err(TimestampFormatError(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(s: &str) -> String {
        format_canonical(&canonicalize(s).unwrap())
    }

    #[test]
    fn canonical_input_is_idempotent() {
        assert_eq!(canon("2024-01-01T12:00:00.000Z"), "2024-01-01T12:00:00.000Z");
    }

    #[test]
    fn classic_microblog_format() {
        assert_eq!(canon("Wed Oct 11 12:00:00 +0000 2023"), "2023-10-11T12:00:00.000Z");
    }

    #[test]
    fn offset_without_colon_converts_to_utc() {
        assert_eq!(canon("2024-01-01T08:00:00-0400"), "2024-01-01T12:00:00.000Z");
    }

    #[test]
    fn offset_with_colon_accepted() {
        assert_eq!(canon("2024-06-15T10:30:00+05:30"), "2024-06-15T05:00:00.000Z");
    }

    #[test]
    fn fractional_seconds_truncate_to_milliseconds() {
        assert_eq!(canon("2024-01-01T12:00:00.123456Z"), "2024-01-01T12:00:00.123Z");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(canon("  2024-01-01T12:00:00.000Z\n"), "2024-01-01T12:00:00.000Z");
    }

    #[test]
    fn unrecognized_format_fails_with_offending_string() {
        let err = canonicalize("not-a-date").unwrap_err();
        assert_eq!(err, TimestampFormatError("not-a-date".to_string()));
    }

    #[test]
    fn idempotent_for_all_accepted_formats() {
        for s in [
            "2024-01-01T12:00:00.000Z",
            "2024-01-01T08:00:00-0400",
            "Wed Oct 11 12:00:00 +0000 2023",
        ] {
            let once = canon(s);
            assert_eq!(canon(&once), once);
        }
    }
}
