//! Time handling for the simulation
//!
//! Observations and resource snapshots carry wall-clock timestamps without a
//! timezone (the upstream feeds are local hospital time). This module
//! provides the shared timestamp type, tolerant parsing, and the elapsed-time
//! arithmetic used by stabilization decay.

use chrono::{NaiveDateTime, ParseError};

/// Wall-clock instant of an observation or snapshot
pub type Timestamp = NaiveDateTime;

/// Accepted input layouts, tried in order.
///
/// `%.f` also matches an absent fractional part.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp in ISO-8601 (`T` separator) or space-separated form
///
/// # Example
/// ```
/// use hospital_flow_core::core::time::parse_timestamp;
///
/// let a = parse_timestamp("2024-03-01T08:30:00").unwrap();
/// let b = parse_timestamp("2024-03-01 08:30:00").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn parse_timestamp(value: &str) -> Result<Timestamp, ParseError> {
    let value = value.trim();
    let mut parsed = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMATS[0]);
    for format in &TIMESTAMP_FORMATS[1..] {
        if parsed.is_ok() {
            break;
        }
        parsed = NaiveDateTime::parse_from_str(value, format);
    }
    parsed
}

/// Minutes elapsed from `earlier` to `later` (fractional, negative if reversed)
///
/// # Example
/// ```
/// use hospital_flow_core::core::time::{minutes_between, parse_timestamp};
///
/// let t0 = parse_timestamp("2024-03-01 08:00:00").unwrap();
/// let t1 = parse_timestamp("2024-03-01 09:01:30").unwrap();
/// assert_eq!(minutes_between(t0, t1), 61.5);
/// ```
pub fn minutes_between(earlier: Timestamp, later: Timestamp) -> f64 {
    (later - earlier).num_seconds() as f64 / 60.0
}

/// Serde adapter accepting any layout understood by [`parse_timestamp`]
pub mod flexible {
    use super::{parse_timestamp, Timestamp};
    use serde::{Deserialize, Deserializer, Serializer};

    const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.format(OUTPUT_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(|e| {
            serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e))
        })
    }
}
