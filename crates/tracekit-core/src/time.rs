use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Integers at or above this magnitude are read as epoch milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

///
/// TimeKey
///
/// Chronological sort key in epoch milliseconds.
/// Missing or unparseable times collapse to `UNDATED`.
///

pub type TimeKey = i64;

/// Key for missing or unparseable times; sorts before every parseable time.
pub const UNDATED: TimeKey = TimeKey::MIN;

/// Parse an event timestamp.
///
/// Accepts RFC 3339, naive date-times (read as UTC), bare dates (midnight
/// UTC) and integer epoch seconds or milliseconds.
#[must_use]
pub fn parse_event_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(n) = raw.parse::<i64>() {
        return if n.unsigned_abs() >= EPOCH_MILLIS_THRESHOLD.unsigned_abs() {
            DateTime::from_timestamp_millis(n)
        } else {
            DateTime::from_timestamp(n, 0)
        };
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Sort key for an optional raw timestamp.
#[must_use]
pub fn time_key(raw: Option<&str>) -> TimeKey {
    raw.and_then(parse_event_time)
        .map_or(UNDATED, |dt| dt.timestamp_millis())
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_with_offset_is_normalized_to_utc() {
        let a = time_key(Some("2024-03-01T10:00:00+02:00"));
        let b = time_key(Some("2024-03-01T08:00:00Z"));

        assert_eq!(a, b);
        assert!(a > 0);
    }

    #[test]
    fn naive_and_date_only_forms_parse() {
        assert!(parse_event_time("2024-03-01 08:00:00").is_some());
        assert!(parse_event_time("2024-03-01T08:00:00.250").is_some());
        assert!(parse_event_time("2024-03-01T08:00").is_some());
        assert_eq!(
            time_key(Some("2024-03-01")),
            time_key(Some("2024-03-01T00:00:00Z"))
        );
    }

    #[test]
    fn epoch_seconds_and_millis_agree() {
        assert_eq!(time_key(Some("1700000000")), time_key(Some("1700000000000")));
    }

    #[test]
    fn missing_and_garbage_sort_first() {
        assert_eq!(time_key(None), UNDATED);
        assert_eq!(time_key(Some("")), UNDATED);
        assert_eq!(time_key(Some("yesterday-ish")), UNDATED);
    }

    #[test]
    fn undated_sorts_before_pre_epoch_times() {
        let moon = time_key(Some("1969-07-20T20:17:00Z"));

        assert!(moon < 0);
        assert!(time_key(None) < moon);
    }

    #[test]
    fn extreme_integers_are_unparseable_not_fatal() {
        assert_eq!(time_key(Some("-9223372036854775808")), UNDATED);
        assert_eq!(time_key(Some("9223372036854775807")), UNDATED);
        assert!(parse_event_time("-100000000000").is_some());
    }
}
