//! The validating request/response wrapper pipeline.
//!
//! Three entry shapes share one decode/normalize core: event-triggered
//! ([`EventLambda`]), HTTP-triggered ([`HttpLambda`]), and GraphQL
//! resolver-triggered ([`ResolverLambda`]). Each variant decodes its payload
//! and auxiliary records against caller-declared schemas, invokes the user
//! handler with a fully-typed context, and normalizes the outcome into the
//! single rejection channel the host runtime expects.
//!
//! An invocation is a single linear pass: payload decode, auxiliary decode,
//! handler, normalize. Every stage is evaluated before the first failure is
//! reported (in stage order), and within a record all failing keys aggregate
//! into one rendered error. There are no retries; each invocation owns a
//! fresh [`LogStore`] which is flushed and cleared during normalization.

use std::future::Future;
use std::sync::Arc;

use lambda_frame_schema::{Decoder, SchemaRecord};
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::FrameworkConfig;
use crate::error::{Error, HandlerFailure};
use crate::event::{EventEnvelope, EventMeta, HttpEvent, ResolverEvent};
use crate::log_store::{LogSink, LogStore, TracingSink};
use crate::record::{resolve_record, RecordKind, ResolvedRecord};

/// Typed inputs assembled for an event-triggered handler.
pub struct EventContext<A> {
    /// Decoded event detail.
    pub detail: A,
    /// Decoded envelope metadata.
    pub meta: EventMeta,
    /// Resolved environment record, when an env schema was declared.
    pub env: Option<ResolvedRecord>,
    /// Log store for the handler's own diagnostics.
    pub logs: Arc<LogStore>,
}

/// Typed inputs assembled for an HTTP-triggered handler.
pub struct HttpContext<A> {
    /// Decoded request body.
    pub body: A,
    /// Resolved environment record, when an env schema was declared.
    pub env: Option<ResolvedRecord>,
    /// Resolved header record, when a header schema was declared.
    pub headers: Option<ResolvedRecord>,
    /// Resolved query record, when a query schema was declared.
    pub query: Option<ResolvedRecord>,
    /// Log store for the handler's own diagnostics.
    pub logs: Arc<LogStore>,
}

/// Typed inputs assembled for a resolver-triggered handler.
pub struct ResolverContext<A> {
    /// Decoded resolver arguments.
    pub args: A,
    /// Resolved environment record, when an env schema was declared.
    pub env: Option<ResolvedRecord>,
    /// Log store for the handler's own diagnostics.
    pub logs: Arc<LogStore>,
}

/// Per-variant wording for payload decode logs and errors.
struct PayloadLabels {
    parsing: &'static str,
    parsed: &'static str,
    error_prefix: &'static str,
}

const EVENT_LABELS: PayloadLabels = PayloadLabels {
    parsing: "parsing event",
    parsed: "parsed event successfully",
    error_prefix: "Incorrect Event Detail",
};

const BODY_LABELS: PayloadLabels = PayloadLabels {
    parsing: "parsing body",
    parsed: "parsed body successfully",
    error_prefix: "Incorrect Body Detail",
};

const ARGS_LABELS: PayloadLabels = PayloadLabels {
    parsing: "parsing args",
    parsed: "parsed args successfully",
    error_prefix: "Incorrect Args",
};

fn decode_payload<D>(
    schema: &D,
    input: &Value,
    labels: &PayloadLabels,
    logs: &LogStore,
) -> Result<D::Output, HandlerFailure>
where
    D: Decoder,
    D::Output: Serialize,
{
    match schema.decode(input) {
        Ok(value) => {
            match serde_json::to_value(&value) {
                Ok(rendered) => logs.append_with(labels.parsed, rendered),
                Err(_) => logs.append(labels.parsed),
            }
            Ok(value)
        }
        Err(error) => Err(HandlerFailure::Message(format!(
            "{}: {error}",
            labels.error_prefix
        ))),
    }
}

/// Normalize the handler outcome into the pipeline's single rejection channel.
///
/// Textual failures pass through tagged; structured failures are logged in
/// full and suppressed to a generic message. The store is flushed and cleared
/// on every path through here.
fn finish<R: Serialize>(logs: &LogStore, outcome: Result<R, HandlerFailure>) -> Result<R, Error> {
    match outcome {
        Ok(value) => {
            match serde_json::to_value(&value) {
                Ok(rendered) => logs.append_with("handler succeeded with payload", rendered),
                Err(_) => logs.append("handler succeeded with payload"),
            }
            logs.reset();
            Ok(value)
        }
        Err(HandlerFailure::Message(message)) => {
            let error = Error::Rejection(message);
            logs.append(format!("handler failed!: {error}"));
            logs.reset();
            Err(error)
        }
        Err(HandlerFailure::Value(value)) => {
            logs.append_with("unknown error...", value);
            let error = Error::Rejection("handler unknown error".to_string());
            logs.append(format!("handler failed!: {error}"));
            logs.reset();
            Err(error)
        }
    }
}

/// Pipeline for event-bus-triggered functions.
pub struct EventLambda<D> {
    detail_schema: D,
    env_schema: Option<SchemaRecord>,
    config: FrameworkConfig,
    sink: Arc<dyn LogSink>,
}

impl<D> EventLambda<D>
where
    D: Decoder,
    D::Output: Serialize,
{
    /// Pipeline decoding the event detail with `detail_schema`.
    pub fn new(detail_schema: D, config: FrameworkConfig) -> Self {
        Self {
            detail_schema,
            env_schema: None,
            config,
            sink: Arc::new(TracingSink),
        }
    }

    /// Declare environment variables to decode before each invocation.
    #[must_use]
    pub fn with_env_schema(mut self, schema: SchemaRecord) -> Self {
        self.env_schema = Some(schema);
        self
    }

    /// Replace the log sink (used by tests to observe emissions).
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Run one invocation: decode, dispatch to `handler`, normalize.
    ///
    /// # Errors
    ///
    /// [`Error::Metadata`] when the envelope violates the platform contract;
    /// [`Error::Rejection`] for every recoverable decode or handler failure.
    pub async fn invoke<F, Fut, R>(&self, event: EventEnvelope, handler: F) -> Result<R, Error>
    where
        F: FnOnce(EventContext<D::Output>) -> Fut,
        Fut: Future<Output = Result<R, HandlerFailure>>,
        R: Serialize,
    {
        let logs = self.store();
        logs.append_with(EVENT_LABELS.parsing, event.detail.clone());

        // The envelope is produced by the platform, not the caller: a bad
        // timestamp aborts fatally and the buffer is abandoned unflushed.
        let meta = EventMeta::from_envelope(&event).map_err(Error::Metadata)?;

        let detail = decode_payload(&self.detail_schema, &event.detail, &EVENT_LABELS, &logs);
        let env = resolve_record(
            RecordKind::Env,
            self.env_schema.as_ref(),
            self.config.env(),
            &logs,
        );

        let staged = match (detail, env) {
            (Ok(detail), Ok(env)) => Ok(EventContext {
                detail,
                meta,
                env,
                logs: Arc::clone(&logs),
            }),
            (Err(failure), _) | (_, Err(failure)) => Err(failure),
        };

        let outcome = match staged {
            Ok(context) => handler(context).await,
            Err(failure) => Err(failure),
        };

        finish(&logs, outcome)
    }

    fn store(&self) -> Arc<LogStore> {
        Arc::new(LogStore::new(
            Arc::clone(&self.sink),
            self.config.log_capacity(),
            self.config.verbose_logs(),
        ))
    }
}

/// Pipeline for HTTP-triggered functions.
pub struct HttpLambda<D> {
    body_schema: D,
    env_schema: Option<SchemaRecord>,
    headers_schema: Option<SchemaRecord>,
    query_schema: Option<SchemaRecord>,
    config: FrameworkConfig,
    sink: Arc<dyn LogSink>,
}

impl<D> HttpLambda<D>
where
    D: Decoder,
    D::Output: Serialize,
{
    /// Pipeline decoding the request body with `body_schema`.
    pub fn new(body_schema: D, config: FrameworkConfig) -> Self {
        Self {
            body_schema,
            env_schema: None,
            headers_schema: None,
            query_schema: None,
            config,
            sink: Arc::new(TracingSink),
        }
    }

    /// Declare environment variables to decode before each invocation.
    #[must_use]
    pub fn with_env_schema(mut self, schema: SchemaRecord) -> Self {
        self.env_schema = Some(schema);
        self
    }

    /// Declare request headers to decode before each invocation.
    #[must_use]
    pub fn with_headers_schema(mut self, schema: SchemaRecord) -> Self {
        self.headers_schema = Some(schema);
        self
    }

    /// Declare query parameters to decode before each invocation.
    #[must_use]
    pub fn with_query_schema(mut self, schema: SchemaRecord) -> Self {
        self.query_schema = Some(schema);
        self
    }

    /// Replace the log sink (used by tests to observe emissions).
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Run one invocation: parse and decode the body, resolve auxiliary
    /// records, dispatch to `handler`, normalize.
    ///
    /// A body that fails to parse as JSON rejects before the schema decoder
    /// ever runs.
    ///
    /// # Errors
    ///
    /// [`Error::Rejection`] for every recoverable decode or handler failure.
    pub async fn invoke<F, Fut, R>(&self, event: HttpEvent, handler: F) -> Result<R, Error>
    where
        F: FnOnce(HttpContext<D::Output>) -> Fut,
        Fut: Future<Output = Result<R, HandlerFailure>>,
        R: Serialize,
    {
        let logs = self.store();
        logs.append_with(BODY_LABELS.parsing, json!({ "body": event.body }));

        let parsed: Result<Value, HandlerFailure> = match event.body.as_deref() {
            Some(raw) => serde_json::from_str(raw).map_err(|_| {
                HandlerFailure::Message(format!("event body not JSON parsable: {raw}"))
            }),
            None => Ok(Value::Null),
        };
        let body =
            parsed.and_then(|value| decode_payload(&self.body_schema, &value, &BODY_LABELS, &logs));

        let env = resolve_record(
            RecordKind::Env,
            self.env_schema.as_ref(),
            self.config.env(),
            &logs,
        );
        let headers = resolve_record(
            RecordKind::Headers,
            self.headers_schema.as_ref(),
            &event.headers,
            &logs,
        );
        let query_raw = event.query_string_parameters.clone().unwrap_or_default();
        let query = resolve_record(
            RecordKind::QueryParams,
            self.query_schema.as_ref(),
            &query_raw,
            &logs,
        );

        let staged = match (body, env, headers, query) {
            (Ok(body), Ok(env), Ok(headers), Ok(query)) => Ok(HttpContext {
                body,
                env,
                headers,
                query,
                logs: Arc::clone(&logs),
            }),
            (Err(failure), _, _, _)
            | (_, Err(failure), _, _)
            | (_, _, Err(failure), _)
            | (_, _, _, Err(failure)) => Err(failure),
        };

        let outcome = match staged {
            Ok(context) => handler(context).await,
            Err(failure) => Err(failure),
        };

        finish(&logs, outcome)
    }

    fn store(&self) -> Arc<LogStore> {
        Arc::new(LogStore::new(
            Arc::clone(&self.sink),
            self.config.log_capacity(),
            self.config.verbose_logs(),
        ))
    }
}

/// Pipeline for GraphQL resolver-triggered functions.
pub struct ResolverLambda<D> {
    args_schema: D,
    env_schema: Option<SchemaRecord>,
    config: FrameworkConfig,
    sink: Arc<dyn LogSink>,
}

impl<D> ResolverLambda<D>
where
    D: Decoder,
    D::Output: Serialize,
{
    /// Pipeline decoding resolver arguments with `args_schema`.
    pub fn new(args_schema: D, config: FrameworkConfig) -> Self {
        Self {
            args_schema,
            env_schema: None,
            config,
            sink: Arc::new(TracingSink),
        }
    }

    /// Declare environment variables to decode before each invocation.
    #[must_use]
    pub fn with_env_schema(mut self, schema: SchemaRecord) -> Self {
        self.env_schema = Some(schema);
        self
    }

    /// Replace the log sink (used by tests to observe emissions).
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Run one invocation: decode arguments, resolve the environment,
    /// dispatch to `handler`, normalize.
    ///
    /// # Errors
    ///
    /// [`Error::Rejection`] for every recoverable decode or handler failure.
    pub async fn invoke<F, Fut, R>(&self, event: ResolverEvent, handler: F) -> Result<R, Error>
    where
        F: FnOnce(ResolverContext<D::Output>) -> Fut,
        Fut: Future<Output = Result<R, HandlerFailure>>,
        R: Serialize,
    {
        let logs = self.store();
        logs.append_with(ARGS_LABELS.parsing, event.arguments.clone());

        let args = decode_payload(&self.args_schema, &event.arguments, &ARGS_LABELS, &logs);
        let env = resolve_record(
            RecordKind::Env,
            self.env_schema.as_ref(),
            self.config.env(),
            &logs,
        );

        let staged = match (args, env) {
            (Ok(args), Ok(env)) => Ok(ResolverContext {
                args,
                env,
                logs: Arc::clone(&logs),
            }),
            (Err(failure), _) | (_, Err(failure)) => Err(failure),
        };

        let outcome = match staged {
            Ok(context) => handler(context).await,
            Err(failure) => Err(failure),
        };

        finish(&logs, outcome)
    }

    fn store(&self) -> Arc<LogStore> {
        Arc::new(LogStore::new(
            Arc::clone(&self.sink),
            self.config.log_capacity(),
            self.config.verbose_logs(),
        ))
    }
}
