//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router / Dispatcher produce:
//!     → logging.rs (structured log events, `dispatch` span per request)
//!     → metrics.rs (outcome and escalation counters, duration histogram)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID is recorded on the dispatch span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
