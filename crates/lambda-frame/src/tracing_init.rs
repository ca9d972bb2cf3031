//! Tracing initialization for Lambda binaries.
//!
//! Configures JSON-formatted tracing output suitable for CloudWatch Logs.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing with JSON formatting for CloudWatch Logs.
///
/// Call once at the start of the Lambda `main`, before serving the pipeline.
/// The log level is controlled via the `RUST_LOG` environment variable and
/// defaults to `info`. Note that the framework's buffered entries are emitted
/// at debug level, so flushed diagnostics require `RUST_LOG=debug` (or a
/// per-crate directive) to appear.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
