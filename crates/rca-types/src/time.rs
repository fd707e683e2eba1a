//! UTC wall-clock helpers shared by the event/episode model.
//!
//! Everything in the core works in millisecond epoch integers internally;
//! RFC3339 strings only exist at the input/output boundary (§6).

use chrono::{SecondsFormat, TimeZone, Utc};
use std::fmt;

/// Failure parsing a timestamp field from an external document.
#[derive(Debug)]
pub struct TimestampParseError {
    input: String,
}

impl fmt::Display for TimestampParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not parse timestamp {:?} as RFC3339 or epoch millis", self.input)
    }
}

impl std::error::Error for TimestampParseError {}

/// Parses a timestamp that is either an RFC3339 string or a bare integer
/// (milliseconds since the epoch, as produced by CSV columns that already
/// carry epoch millis).
pub fn parse_timestamp_millis(input: &str) -> Result<i64, TimestampParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimestampParseError { input: input.to_string() });
    }
    if let Ok(ms) = trimmed.parse::<i64>() {
        return Ok(ms);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc).timestamp_millis());
    }
    Err(TimestampParseError { input: input.to_string() })
}

/// Formats an epoch-millisecond timestamp as an RFC3339/ISO-8601 UTC string.
pub fn millis_to_rfc3339(ms: i64) -> String {
    let secs = ms.div_euclid(1000);
    let nanos = (ms.rem_euclid(1000) * 1_000_000) as u32;
    Utc.timestamp_opt(secs, nanos)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap())
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_rfc3339() {
        let ms = parse_timestamp_millis("2024-01-01T10:00:00Z").unwrap();
        assert_eq!(millis_to_rfc3339(ms), "2024-01-01T10:00:00.000Z");
    }

    #[test]
    fn accepts_bare_epoch_millis() {
        assert_eq!(parse_timestamp_millis("1704103200000").unwrap(), 1_704_103_200_000);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp_millis("not-a-time").is_err());
        assert!(parse_timestamp_millis("").is_err());
    }
}
