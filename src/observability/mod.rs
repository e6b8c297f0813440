//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging throughout; request ID flows through all events
//! - Metric updates are cheap atomic increments
//! - The exporter listener is optional and off the request path

pub mod logging;
pub mod metrics;
