//! Wire-format helpers shared by the record models.
//!
//! The record store emits timestamps either as RFC 3339 or as
//! `YYYY-MM-DD HH:MM:SS.sssZ`, and empty text fields as `""` rather than
//! `null`.

use crate::Time;
use chrono::{NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Parse either timestamp form the store produces.
pub fn parse_time(raw: &str) -> Option<Time> {
    let raw = raw.trim();
    if let Ok(t) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    let naive = raw.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc())
}

/// Render a timestamp the way it is written back to the store.
pub fn format_time(t: &Time) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `serde(with = ...)` module for required timestamps.
pub mod timestamp {
    use super::*;

    /// Serialize as RFC 3339 with millisecond precision.
    pub fn serialize<S: Serializer>(t: &Time, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_time(t))
    }

    /// Deserialize from either store form.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Time, D::Error> {
        let raw = String::deserialize(d)?;
        parse_time(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw:?}")))
    }
}

/// `serde(with = ...)` module for optional timestamps (`""`/`null` → `None`).
pub mod opt_timestamp {
    use super::*;

    /// Serialize `None` as `null`.
    pub fn serialize<S: Serializer>(t: &Option<Time>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_str(&format_time(t)),
            None => s.serialize_none(),
        }
    }

    /// Deserialize, treating empty strings as absent.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Time>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_time(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {s:?}"))),
        }
    }
}

/// Deserialize optional text, mapping `""` to `None`.
pub fn empty_as_none<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.filter(|s| !s.is_empty()))
}

/// Deserialize a file field that may hold one name, a list, or nothing.
pub fn one_or_many<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Files {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<Files>::deserialize(d)? {
        None => Vec::new(),
        Some(Files::One(s)) if s.is_empty() => Vec::new(),
        Some(Files::One(s)) => vec![s],
        Some(Files::Many(v)) => v.into_iter().filter(|s| !s.is_empty()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_both_timestamp_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 10, 23, 59, 0).unwrap();
        assert_eq!(parse_time("2024-01-10T23:59:00Z"), Some(expected));
        assert_eq!(parse_time("2024-01-10 23:59:00.000Z"), Some(expected));
        assert_eq!(parse_time("2024-01-10 23:59:00Z"), Some(expected));
        assert_eq!(parse_time("yesterday"), None);
    }

    #[test]
    fn test_format_time_is_rfc3339_millis() {
        let t = Utc.with_ymd_and_hms(2024, 1, 11, 0, 1, 0).unwrap();
        assert_eq!(format_time(&t), "2024-01-11T00:01:00.000Z");
    }
}
