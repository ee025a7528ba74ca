//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use flaky_backend::availability::AvailabilityState;
use flaky_backend::config::BehaviorConfig;
use flaky_backend::generators::RandomSource;
use flaky_backend::http::{shared_engine, SharedEngine};
use tokio::net::TcpStream;
use tokio::sync::watch;

/// Loopback config with ephemeral ports and short timings.
pub fn config() -> BehaviorConfig {
    BehaviorConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        jitter_port: 0,
        content: "hello".to_string(),
        min_delay: Duration::ZERO,
        max_delay: Duration::from_millis(200),
        min_body_size: 0,
        max_body_size: 1024,
        dead_time: Duration::from_millis(500),
        ..BehaviorConfig::default()
    }
}

pub fn engine(config: BehaviorConfig, random: Arc<dyn RandomSource>) -> SharedEngine {
    shared_engine(Arc::new(config), random).unwrap()
}

/// Client that never reuses connections, so every request opens a new one.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

pub async fn accepts(addr: SocketAddr) -> bool {
    TcpStream::connect(addr).await.is_ok()
}

/// Wait until the published state equals `state`, failing after `limit`.
pub async fn wait_for_state(
    rx: &mut watch::Receiver<AvailabilityState>,
    state: AvailabilityState,
    limit: Duration,
) {
    tokio::time::timeout(limit, rx.wait_for(|current| *current == state))
        .await
        .unwrap_or_else(|_| panic!("state never became {state}"))
        .unwrap();
}
