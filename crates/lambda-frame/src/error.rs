use lambda_frame_schema::DecodeError;
use serde_json::Value;
use thiserror::Error;

/// Prefix identifying error messages originating from this wrapper layer.
pub const FRAMEWORK_TAG: &str = "lambda-frame";

/// Failure value a handler (or a decode stage) reports through the pipeline.
///
/// Textual failures pass through to the caller verbatim, prefixed with the
/// framework tag. Structured failures are suppressed to a generic message and
/// surface only in the flushed logs, so internal error shapes never leak to
/// the pipeline caller.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerFailure {
    /// Human-readable failure, surfaced to the caller.
    Message(String),
    /// Structured failure, logged but not surfaced.
    Value(Value),
}

impl HandlerFailure {
    /// Textual failure.
    pub fn message(message: impl Into<String>) -> Self {
        HandlerFailure::Message(message.into())
    }

    /// Structured failure.
    pub fn value(value: Value) -> Self {
        HandlerFailure::Value(value)
    }
}

impl From<String> for HandlerFailure {
    fn from(message: String) -> Self {
        HandlerFailure::Message(message)
    }
}

impl From<&str> for HandlerFailure {
    fn from(message: &str) -> Self {
        HandlerFailure::Message(message.to_string())
    }
}

/// Terminal pipeline error handed to the host runtime.
#[derive(Debug, Error)]
pub enum Error {
    /// Normalized rejection: decode failures and handler failures, always
    /// rendered as a tagged single-line-prefixed message.
    #[error("[{tag}] {0}", tag = FRAMEWORK_TAG)]
    Rejection(String),

    /// Event envelope metadata violated the platform contract (for example an
    /// unparsable timestamp). Unrecoverable: bypasses normalization.
    #[error("incorrect event metadata: {0}")]
    Metadata(DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_display_carries_framework_tag() {
        let error = Error::Rejection("utter failure".to_string());
        assert_eq!(error.to_string(), "[lambda-frame] utter failure");
    }

    #[test]
    fn metadata_display_renders_decode_tree() {
        let error = Error::Metadata(DecodeError::string_value("mock", "parsable into a Date"));
        assert_eq!(
            error.to_string(),
            "incorrect event metadata: cannot decode \"mock\", should be parsable into a Date"
        );
    }
}
