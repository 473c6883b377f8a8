//! Date/time utilities.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as ISO-8601 with millisecond precision and a `Z` suffix.
///
/// This is the format used for `uploadedAt` in the metadata log,
/// e.g. `2024-01-15T10:30:00.123Z`.
pub fn to_iso8601(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter that writes timestamps with [`to_iso8601`].
///
/// Any RFC 3339 timestamp is accepted on the way back in.
pub mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_iso8601(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
