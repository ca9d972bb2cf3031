//! Host adapter: wires a configured pipeline into the Lambda runtime.
//!
//! Each function here is the outermost composition point of a Lambda binary:
//!
//! ```no_run
//! use lambda_frame::{run_http, FrameworkConfig, HandlerFailure, HttpLambda};
//! use lambda_frame_schema::{ObjectSchema, Shape};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize, Serialize)]
//! struct Body {
//!     foo: String,
//! }
//!
//! #[derive(Serialize)]
//! struct Reply {
//!     ok: bool,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lambda_runtime::Error> {
//!     lambda_frame::init_tracing();
//!     let pipeline = HttpLambda::new(
//!         ObjectSchema::<Body>::new().prop("foo", Shape::String),
//!         FrameworkConfig::from_process_env(),
//!     );
//!     run_http(&pipeline, |ctx| async move {
//!         ctx.logs.append(format!("handling {}", ctx.body.foo));
//!         Ok::<_, HandlerFailure>(Reply { ok: true })
//!     })
//!     .await
//! }
//! ```

use std::future::Future;

use lambda_frame_schema::Decoder;
use lambda_runtime::{service_fn, LambdaEvent};
use serde::Serialize;

use crate::error::HandlerFailure;
use crate::event::{EventEnvelope, HttpEvent, ResolverEvent};
use crate::pipeline::{
    EventContext, EventLambda, HttpContext, HttpLambda, ResolverContext, ResolverLambda,
};

/// Serve an event-triggered pipeline until the runtime shuts down.
///
/// # Errors
///
/// Propagates runtime transport failures from `lambda_runtime::run`.
pub async fn run_event<D, F, Fut, R>(
    pipeline: &EventLambda<D>,
    handler: F,
) -> Result<(), lambda_runtime::Error>
where
    D: Decoder,
    D::Output: Serialize,
    F: Fn(EventContext<D::Output>) -> Fut,
    Fut: Future<Output = Result<R, HandlerFailure>>,
    R: Serialize,
{
    let handler = &handler;
    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<EventEnvelope>| async move {
            pipeline
                .invoke(event.payload, handler)
                .await
                .map_err(lambda_runtime::Error::from)
        },
    ))
    .await
}

/// Serve an HTTP-triggered pipeline until the runtime shuts down.
///
/// # Errors
///
/// Propagates runtime transport failures from `lambda_runtime::run`.
pub async fn run_http<D, F, Fut, R>(
    pipeline: &HttpLambda<D>,
    handler: F,
) -> Result<(), lambda_runtime::Error>
where
    D: Decoder,
    D::Output: Serialize,
    F: Fn(HttpContext<D::Output>) -> Fut,
    Fut: Future<Output = Result<R, HandlerFailure>>,
    R: Serialize,
{
    let handler = &handler;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<HttpEvent>| async move {
        pipeline
            .invoke(event.payload, handler)
            .await
            .map_err(lambda_runtime::Error::from)
    }))
    .await
}

/// Serve a resolver-triggered pipeline until the runtime shuts down.
///
/// # Errors
///
/// Propagates runtime transport failures from `lambda_runtime::run`.
pub async fn run_resolver<D, F, Fut, R>(
    pipeline: &ResolverLambda<D>,
    handler: F,
) -> Result<(), lambda_runtime::Error>
where
    D: Decoder,
    D::Output: Serialize,
    F: Fn(ResolverContext<D::Output>) -> Fut,
    Fut: Future<Output = Result<R, HandlerFailure>>,
    R: Serialize,
{
    let handler = &handler;
    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<ResolverEvent>| async move {
            pipeline
                .invoke(event.payload, handler)
                .await
                .map_err(lambda_runtime::Error::from)
        },
    ))
    .await
}
