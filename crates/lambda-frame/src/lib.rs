//! Validating request/response wrapper pipeline for AWS Lambda handlers.
//!
//! This crate wraps cloud-function entry points (event-driven, HTTP, and
//! GraphQL resolver triggers) with schema validation of payloads and
//! environment, bounded per-invocation log buffering, and uniform error
//! propagation back to the hosting runtime:
//!
//! - [`EventLambda`] / [`HttpLambda`] / [`ResolverLambda`]: the three
//!   pipeline variants sharing one decode/normalize core
//! - [`LogStore`]: bounded log buffer with flush-on-completion semantics,
//!   controlled by the `FRAMEWORK_LOGS` setting
//! - [`FrameworkConfig`]: explicit environment snapshot injected into the
//!   pipeline instead of ambient process-global reads
//! - [`run_event`] / [`run_http`] / [`run_resolver`]: thin adapters into
//!   `lambda_runtime`
//! - [`init_tracing`]: JSON-formatted tracing for CloudWatch Logs
//!
//! Schemas come from the companion `lambda-frame-schema` crate. Handlers
//! receive a fully-typed context only after every declared decode stage has
//! succeeded, and report failure through [`HandlerFailure`]: textual failures
//! reach the caller prefixed with the framework tag, structured failures are
//! logged and suppressed to a generic message.

#![deny(warnings)]

mod config;
mod error;
mod event;
mod host;
mod log_store;
mod pipeline;
mod record;
mod tracing_init;

pub use config::{FrameworkConfig, DEFAULT_LOG_CAPACITY, VERBOSE_LOGS_VAR};
pub use error::{Error, HandlerFailure, FRAMEWORK_TAG};
pub use event::{EventEnvelope, EventMeta, HttpEvent, ResolverEvent};
pub use host::{run_event, run_http, run_resolver};
pub use log_store::{LogEntry, LogSink, LogStore, TracingSink};
pub use pipeline::{
    EventContext, EventLambda, HttpContext, HttpLambda, ResolverContext, ResolverLambda,
};
pub use record::{RecordKind, ResolvedRecord};
pub use tracing_init::init_tracing;
