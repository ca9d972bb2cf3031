//! Inbound event shapes consumed from the host runtime.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use lambda_frame_schema::{decode_timestamp, DecodeError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// EventBridge-style envelope for event-triggered functions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventEnvelope {
    /// Event identifier assigned by the bus.
    pub id: String,
    /// Envelope schema version.
    pub version: String,
    /// Account that emitted the event.
    pub account: String,
    /// ISO-8601 timestamp string; decoded into [`EventMeta::time`].
    pub time: String,
    /// Region the event was emitted in.
    pub region: String,
    /// Resource ARNs associated with the event.
    #[serde(default)]
    pub resources: Vec<String>,
    /// Emitting service or application.
    pub source: String,
    /// Detail-type discriminator.
    #[serde(rename = "detail-type")]
    pub detail_type: String,
    /// Unstructured payload; decoded by the caller-supplied schema.
    pub detail: Value,
}

/// Decoded envelope metadata handed to event handlers.
///
/// Fields are copied verbatim from the envelope except `time`, which is
/// decoded into a UTC datetime. A timestamp that fails to decode is a
/// platform-contract violation and aborts the invocation fatally.
#[derive(Debug, Clone, PartialEq)]
pub struct EventMeta {
    /// Event identifier.
    pub id: String,
    /// Envelope schema version.
    pub version: String,
    /// Emitting account.
    pub account: String,
    /// Emission time.
    pub time: DateTime<Utc>,
    /// Emitting region.
    pub region: String,
    /// Associated resource ARNs.
    pub resources: Vec<String>,
    /// Emitting service or application.
    pub source: String,
    /// Detail-type discriminator.
    pub detail_type: String,
}

impl EventMeta {
    /// Decode envelope metadata, excluding the payload.
    pub fn from_envelope(envelope: &EventEnvelope) -> Result<Self, DecodeError> {
        Ok(Self {
            id: envelope.id.clone(),
            version: envelope.version.clone(),
            account: envelope.account.clone(),
            time: decode_timestamp(&envelope.time)?,
            region: envelope.region.clone(),
            resources: envelope.resources.clone(),
            source: envelope.source.clone(),
            detail_type: envelope.detail_type.clone(),
        })
    }
}

/// API-Gateway-style proxy event for HTTP-triggered functions.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HttpEvent {
    /// Raw request body, if any.
    pub body: Option<String>,
    /// Request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Query string parameters, absent when the URL carries none.
    #[serde(rename = "queryStringParameters", default)]
    pub query_string_parameters: Option<BTreeMap<String, String>>,
}

/// AppSync-style resolver event for GraphQL-triggered functions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverEvent {
    /// Resolver arguments; decoded by the caller-supplied schema.
    pub arguments: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(time: &str) -> EventEnvelope {
        EventEnvelope {
            id: "mock".to_string(),
            version: "0".to_string(),
            account: "123456789012".to_string(),
            time: time.to_string(),
            region: "eu-west-1".to_string(),
            resources: vec![],
            source: "catalog".to_string(),
            detail_type: "item-updated".to_string(),
            detail: json!({}),
        }
    }

    #[test]
    fn meta_decodes_timestamp() {
        let meta = EventMeta::from_envelope(&envelope("2024-03-02T10:15:30Z")).unwrap();
        assert_eq!(meta.time.to_rfc3339(), "2024-03-02T10:15:30+00:00");
        assert_eq!(meta.detail_type, "item-updated");
    }

    #[test]
    fn meta_rejects_unparsable_timestamp() {
        let error = EventMeta::from_envelope(&envelope("mock")).unwrap_err();
        assert!(error.to_string().contains("parsable into a Date"));
    }

    #[test]
    fn envelope_deserializes_detail_type_alias() {
        let envelope: EventEnvelope = serde_json::from_value(json!({
            "id": "1",
            "version": "0",
            "account": "123456789012",
            "time": "2024-03-02T10:15:30Z",
            "region": "eu-west-1",
            "resources": ["arn:aws:events:eu-west-1:123456789012:rule/catalog"],
            "source": "catalog",
            "detail-type": "item-updated",
            "detail": {"foo": "foo"}
        }))
        .unwrap();
        assert_eq!(envelope.detail_type, "item-updated");
        assert_eq!(envelope.detail, json!({"foo": "foo"}));
    }

    #[test]
    fn http_event_defaults_optional_fields() {
        let event: HttpEvent = serde_json::from_value(json!({"body": null})).unwrap();
        assert!(event.body.is_none());
        assert!(event.headers.is_empty());
        assert!(event.query_string_parameters.is_none());
    }
}
