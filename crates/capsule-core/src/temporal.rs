//! # Temporal Types — UTC Run Timestamps
//!
//! `Timestamp` brackets harness runs. It is always UTC, carries millisecond
//! precision, and renders as `YYYY-MM-DDTHH:MM:SS.mmmZ`.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CapsuleError;

/// A UTC-only timestamp, truncated to millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to milliseconds.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// From a `chrono::DateTime<Utc>`, truncating below milliseconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_millis(dt))
    }

    /// Parse an RFC 3339 string, converting any offset to UTC.
    pub fn parse(s: &str) -> Result<Self, CapsuleError> {
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| CapsuleError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self::from_utc(dt.with_timezone(&Utc)))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as ISO 8601 with milliseconds and Z suffix.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn truncate_to_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    let millis = dt.nanosecond() / 1_000_000;
    dt.with_nanosecond(millis * 1_000_000).unwrap_or(dt)
}
