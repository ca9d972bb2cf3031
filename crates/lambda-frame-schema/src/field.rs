//! Codecs for flat string-keyed records (environment, headers, query).
//!
//! Every raw source decoded here is a map of strings, so a field codec takes
//! an optional raw string and either accepts it (returning the validated
//! string) or reports a leaf [`DecodeError`]. The same closed set of codecs
//! serves environment variables, HTTP headers, and query parameters.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::DecodeError;

/// Codec for a single string-valued field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSchema {
    /// Any string.
    String,
    /// A string with at least one character.
    NonEmpty,
    /// A string parsable as a floating-point number.
    NumberFromString,
    /// An RFC 3339 / ISO-8601 timestamp string.
    IsoTimestamp,
    /// A string parsable as JSON.
    Json,
    /// A hyphenated UUID string.
    Uuid,
}

impl FieldSchema {
    /// Human description used in `should be ...` renderings.
    pub fn expected(&self) -> &'static str {
        match self {
            FieldSchema::String => "string",
            FieldSchema::NonEmpty => "a non-empty string",
            FieldSchema::NumberFromString => "parsable into a number",
            FieldSchema::IsoTimestamp => "parsable into a Date",
            FieldSchema::Json => "parsable into JSON",
            FieldSchema::Uuid => "UUID",
        }
    }

    /// Decode an optional raw string, returning the validated string.
    pub fn decode(&self, raw: Option<&str>) -> Result<String, DecodeError> {
        let Some(raw) = raw else {
            return Err(DecodeError::missing(self.expected()));
        };

        let ok = match self {
            FieldSchema::String => true,
            FieldSchema::NonEmpty => !raw.is_empty(),
            FieldSchema::NumberFromString => raw.parse::<f64>().is_ok(),
            FieldSchema::IsoTimestamp => DateTime::parse_from_rfc3339(raw).is_ok(),
            FieldSchema::Json => serde_json::from_str::<serde_json::Value>(raw).is_ok(),
            FieldSchema::Uuid => is_uuid(raw),
        };

        if ok {
            Ok(raw.to_string())
        } else {
            Err(DecodeError::string_value(raw, self.expected()))
        }
    }
}

/// Caller-declared mapping from field names to codecs.
///
/// A `BTreeMap` keeps iteration deterministic, so aggregated error renders
/// list failing keys in a stable order.
pub type SchemaRecord = BTreeMap<String, FieldSchema>;

/// Build a [`SchemaRecord`] from `(key, codec)` pairs.
pub fn schema_record<'a>(pairs: impl IntoIterator<Item = (&'a str, FieldSchema)>) -> SchemaRecord {
    pairs
        .into_iter()
        .map(|(key, schema)| (key.to_string(), schema))
        .collect()
}

/// Decode an RFC 3339 timestamp string into a UTC datetime.
pub fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, DecodeError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| DecodeError::string_value(raw, "parsable into a Date"))
}

fn is_uuid(raw: &str) -> bool {
    let groups: Vec<&str> = raw.split('-').collect();
    groups.len() == 5
        && [8usize, 4, 4, 4, 12]
            .iter()
            .zip(&groups)
            .all(|(len, group)| group.len() == *len && group.chars().all(|c| c.is_ascii_hexdigit()))
}
