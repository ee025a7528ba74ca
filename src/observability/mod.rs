//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Behavior handlers, listeners, availability controllers
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Metric calls are no-ops until a recorder is installed
//! - Log level comes from `RUST_LOG`, with a crate-level default

pub mod logging;
pub mod metrics;
