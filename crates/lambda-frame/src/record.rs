//! Flat record resolver for environment, header, and query schemas.
//!
//! One generic decode-and-aggregate routine instantiated three times: the
//! [`RecordKind`] label only affects log lines and the error-message prefix.

use std::collections::BTreeMap;
use std::fmt;

use lambda_frame_schema::{DecodeError, SchemaRecord};
use serde_json::json;

use crate::error::HandlerFailure;
use crate::log_store::LogStore;

/// Which raw source a schema record decodes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Process-environment snapshot.
    Env,
    /// HTTP request headers.
    Headers,
    /// HTTP query string parameters.
    QueryParams,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Env => "Env",
            RecordKind::Headers => "Headers",
            RecordKind::QueryParams => "Query Params",
        })
    }
}

/// Fully-decoded record handed to handlers.
pub type ResolvedRecord = BTreeMap<String, String>;

/// Decode every declared key of `schema` against `raw`.
///
/// Applicative aggregation: all keys are decoded and all failures are
/// collected into one rendered error, rather than stopping at the first.
/// An absent schema resolves to `Ok(None)` without inspecting the source.
pub(crate) fn resolve_record(
    kind: RecordKind,
    schema: Option<&SchemaRecord>,
    raw: &BTreeMap<String, String>,
    logs: &LogStore,
) -> Result<Option<ResolvedRecord>, HandlerFailure> {
    let Some(schema) = schema else {
        return Ok(None);
    };

    let mut resolved = ResolvedRecord::new();
    let mut errors = Vec::new();

    for (key, field) in schema {
        logs.append_with(format!("parsing {kind}"), json!({ "key": key }));
        match field.decode(raw.get(key).map(String::as_str)) {
            Ok(value) => {
                logs.append(format!("parsed {kind} successfully"));
                resolved.insert(key.clone(), value);
            }
            Err(error) => errors.push(DecodeError::key(key, error)),
        }
    }

    if errors.is_empty() {
        Ok(Some(resolved))
    } else {
        Err(HandlerFailure::Message(format!(
            "incorrect {kind} runtime: {}",
            DecodeError::aggregate(errors)
        )))
    }
}
