//! Metrics collection and exposition.
//!
//! # Metrics
//! - `flaky_responses_total` (counter): responses by behavior, status
//! - `flaky_response_duration_seconds` (histogram): time spent producing a response, by behavior
//! - `flaky_listener_up` (gauge): 1 while a listener accepts connections, 0 otherwise
//! - `flaky_availability_transitions_total` (counter): availability changes by listener, target state

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::availability::AvailabilityState;

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one served response.
pub fn record_response(behavior: &'static str, status: u16, start: Instant) {
    ::metrics::counter!(
        "flaky_responses_total",
        "behavior" => behavior,
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("flaky_response_duration_seconds", "behavior" => behavior)
        .record(start.elapsed().as_secs_f64());
}

/// Record an availability change of a named listener.
pub fn record_availability(listener: &'static str, state: AvailabilityState) {
    let up = if state.is_up() { 1.0 } else { 0.0 };
    ::metrics::gauge!("flaky_listener_up", "listener" => listener).set(up);
    ::metrics::counter!(
        "flaky_availability_transitions_total",
        "listener" => listener,
        "to" => state.as_str()
    )
    .increment(1);
}
