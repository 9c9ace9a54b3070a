//! ## kassavakt-telemetry::logging
//! **Structured logging with tracing**
//!
//! Logs go to stderr; stdout is reserved for reports and the prompt.

use tracing::info_span;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. `RUST_LOG` overrides `default_level`.
    ///
    /// Calling this more than once is harmless; later calls are ignored.
    pub fn init(default_level: &str) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .try_init();
    }

    /// Records the outcome of one evaluated request.
    #[inline]
    pub fn log_request(process: usize, request: &str, outcome: &str) {
        let span = info_span!("request", process, otel.kind = "INTERNAL");
        let _entered = span.enter();
        tracing::info!(request, outcome, "Request evaluated");
    }

    /// Records the result of a safety check.
    #[inline]
    pub fn log_safety(safe: bool, sequence: &str) {
        tracing::info!(safe, sequence, "Safety check completed");
    }
}
