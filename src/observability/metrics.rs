//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dispatch_requests_total` (counter): dispatches by outcome
//! - `dispatch_escalations_total` (counter): escalations by failure kind
//! - `dispatch_fallbacks_total` (counter): escalations that failed again
//! - `dispatch_duration_seconds` (histogram): time spent in the dispatcher
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so the dispatcher
//!   can be used in tests without an exporter

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::dispatch::FailureKind;

/// Install the Prometheus recorder and its scrape endpoint.
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a finished dispatch.
pub fn record_dispatch(outcome: &'static str, start: Instant) {
    counter!("dispatch_requests_total", "outcome" => outcome).increment(1);
    histogram!("dispatch_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record an escalation to the error handler.
pub fn record_escalation(kind: FailureKind) {
    counter!("dispatch_escalations_total", "kind" => kind.action_name()).increment(1);
}

/// Record a failed escalation answered with the fallback output.
pub fn record_fallback() {
    counter!("dispatch_fallbacks_total").increment(1);
}
