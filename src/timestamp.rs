//! Timestamp normalization for the chat store.
//!
//! The store mixes three encodings in the same kind of column and never tags which
//! one a value uses, so the encoding is picked by magnitude:
//!
//! | raw value              | encoding                                  |
//! |------------------------|-------------------------------------------|
//! | `> 10^12`              | nanoseconds since 2001-01-01T00:00:00Z    |
//! | `< 10^9`               | seconds since 2001-01-01T00:00:00Z        |
//! | `10^9 ..= 10^12`       | Unix seconds                              |
//!
//! The bounds are exact; output must stay bit-compatible with earlier exports.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use std::time::SystemTime;

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z.
pub const APPLE_EPOCH_OFFSET_SECS: i64 = 978_307_200;

/// Raw values above this are nanosecond counts.
pub const NANOSECOND_THRESHOLD: i64 = 1_000_000_000_000;

/// Raw values below this are whole seconds since the 2001 epoch.
pub const APPLE_SECONDS_THRESHOLD: i64 = 1_000_000_000;

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Canonical output format: ISO-8601, UTC, millisecond precision.
const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Which branch of the magnitude partition a raw timestamp falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampEncoding {
    /// Nanoseconds since the 2001 epoch
    AppleNanoseconds,
    /// Seconds since the 2001 epoch
    AppleSeconds,
    /// Seconds since the Unix epoch
    UnixSeconds,
}

impl TimestampEncoding {
    /// Classify a raw, non-null timestamp.
    #[must_use]
    pub const fn classify(raw: i64) -> Self {
        if raw > NANOSECOND_THRESHOLD {
            Self::AppleNanoseconds
        } else if raw < APPLE_SECONDS_THRESHOLD {
            Self::AppleSeconds
        } else {
            Self::UnixSeconds
        }
    }

    /// Convert a raw value in this encoding to Unix seconds.
    #[must_use]
    pub const fn to_unix_seconds(self, raw: i64) -> i64 {
        match self {
            Self::AppleNanoseconds => raw.div_euclid(NANOS_PER_SEC) + APPLE_EPOCH_OFFSET_SECS,
            Self::AppleSeconds => raw + APPLE_EPOCH_OFFSET_SECS,
            Self::UnixSeconds => raw,
        }
    }
}

/// Normalize a raw store timestamp to a canonical ISO-8601 UTC string.
///
/// Returns `None` for a missing or zero value, and for values that cannot be
/// represented as a calendar date.
#[must_use]
pub fn normalize_apple_timestamp(raw: Option<i64>) -> Option<String> {
    let raw = raw.filter(|value| *value != 0)?;
    let unix_seconds = TimestampEncoding::classify(raw).to_unix_seconds(raw);
    DateTime::<Utc>::from_timestamp(unix_seconds, 0).map(|dt| format_canonical(&dt))
}

/// Format any UTC time in the canonical output format.
#[must_use]
pub fn format_canonical(dt: &DateTime<Utc>) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

/// Format a file-system time in the canonical output format.
#[must_use]
pub fn system_time_to_iso(time: SystemTime) -> String {
    format_canonical(&DateTime::<Utc>::from(time))
}

/// Convert Unix seconds to the nanosecond encoding, or `None` when the
/// instant lies outside what an `i64` nanosecond count can hold (before
/// about 1709 or after about 2293).
#[must_use]
pub const fn apple_nanos_from_unix(unix_seconds: i64) -> Option<i64> {
    unix_seconds.saturating_sub(APPLE_EPOCH_OFFSET_SECS).checked_mul(NANOS_PER_SEC)
}

/// Start of `date` (00:00:00 UTC) as Unix seconds.
#[must_use]
pub fn unix_at_start_of(date: NaiveDate) -> i64 {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)).timestamp()
}

/// Last second of `date` (UTC) as Unix seconds.
#[must_use]
pub fn unix_at_end_of(date: NaiveDate) -> i64 {
    date.succ_opt().map_or(i64::MAX, |next| unix_at_start_of(next) - 1)
}

/// Raw nanosecond values that normalize into `[start, end]` Unix seconds.
fn nanosecond_window(start: i64, end: i64) -> Option<(i64, i64)> {
    let low = match apple_nanos_from_unix(start) {
        Some(nanos) => nanos,
        None if start > 0 => return None,
        None => i64::MIN,
    };
    let high = match apple_nanos_from_unix(end.saturating_add(1)) {
        Some(nanos) => nanos - 1,
        None if end > 0 => i64::MAX,
        None => return None,
    };
    Some((low.max(NANOSECOND_THRESHOLD + 1), high))
}

/// Raw-value windows whose normalized time lies in `[start, end]` Unix seconds.
///
/// One inclusive window per encoding, each clipped to the magnitude band
/// [`TimestampEncoding::classify`] assigns to it; empty windows are dropped.
/// A raw value falls in some window exactly when its normalized second is in range.
#[must_use]
pub fn raw_windows_for_unix_span(start: i64, end: i64) -> Vec<(i64, i64)> {
    let apple_seconds = end.checked_sub(APPLE_EPOCH_OFFSET_SECS).map(|high| {
        let low = start.checked_sub(APPLE_EPOCH_OFFSET_SECS).unwrap_or(i64::MIN);
        (low, high.min(APPLE_SECONDS_THRESHOLD - 1))
    });
    let unix_seconds = (start.max(APPLE_SECONDS_THRESHOLD), end.min(NANOSECOND_THRESHOLD));

    nanosecond_window(start, end)
        .into_iter()
        .chain(apple_seconds)
        .chain([unix_seconds])
        .filter(|(low, high)| low <= high)
        .collect()
}
