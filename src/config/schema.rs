//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::size;
use crate::generators::codes::CodeFamily;

/// Root configuration shared by the behavior engine and both listeners.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Interface both listeners bind to.
    pub host: String,

    /// Port of the manual-kill listener.
    pub port: u16,

    /// Port of the jitter listener.
    pub jitter_port: u16,

    /// Log elapsed time, status and path of every request.
    pub verbose: bool,

    /// Body returned by `/success` and `/wait`.
    pub content: String,

    /// `Name:Value` pairs set on every behavior response.
    pub headers: Vec<String>,

    /// Smallest generated `/content_size` body, in bytes.
    #[serde(deserialize_with = "size::deserialize")]
    pub min_body_size: u64,

    /// Largest generated `/content_size` body, in bytes.
    #[serde(deserialize_with = "size::deserialize")]
    pub max_body_size: u64,

    /// Draw the body size from `[min_body_size, max_body_size)` instead of
    /// always using `max_body_size`.
    pub random_body_size: bool,

    /// Shortest `/wait` delay.
    #[serde(with = "humantime_serde")]
    pub min_delay: Duration,

    /// Longest `/wait` delay.
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,

    /// Draw the delay from `[min_delay, max_delay)` instead of always
    /// sleeping `max_delay`.
    pub random_delay: bool,

    /// How long the manual-kill listener stays down after `/dead_or_alive`.
    #[serde(with = "humantime_serde")]
    pub dead_time: Duration,

    /// Up/down toggle period of the jitter listener. Zero disables it.
    #[serde(with = "humantime_serde")]
    pub jitter_interval: Duration,

    /// Prometheus scrape address (e.g. "127.0.0.1:9090"). Unset disables
    /// the exporter.
    pub metrics_address: Option<String>,

    /// Status code families drawn by the error and redirect endpoints.
    pub codes: CodeSetConfig,
}

impl BehaviorConfig {
    /// Address of the manual-kill listener.
    pub fn harness_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Address of the jitter listener.
    pub fn jitter_address(&self) -> String {
        format!("{}:{}", self.host, self.jitter_port)
    }

    pub fn jitter_enabled(&self) -> bool {
        !self.jitter_interval.is_zero()
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            jitter_port: 8001,
            verbose: false,
            content: String::new(),
            headers: Vec::new(),
            min_body_size: 10_000,
            max_body_size: 100_000,
            random_body_size: false,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            random_delay: false,
            dead_time: Duration::from_secs(5),
            jitter_interval: Duration::ZERO,
            metrics_address: None,
            codes: CodeSetConfig::default(),
        }
    }
}

/// Status codes each family endpoint draws from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CodeSetConfig {
    /// Codes for `/redirect` (3xx).
    pub redirection: Vec<u16>,

    /// Codes for `/client_error` (4xx).
    pub client_error: Vec<u16>,

    /// Codes for `/server_error` (5xx).
    pub server_error: Vec<u16>,
}

impl CodeSetConfig {
    /// Configured codes for a family.
    pub fn codes(&self, family: CodeFamily) -> &[u16] {
        match family {
            CodeFamily::Redirection => &self.redirection,
            CodeFamily::ClientError => &self.client_error,
            CodeFamily::ServerError => &self.server_error,
        }
    }
}

impl Default for CodeSetConfig {
    fn default() -> Self {
        Self {
            redirection: CodeFamily::Redirection.defaults().to_vec(),
            client_error: CodeFamily::ClientError.defaults().to_vec(),
            server_error: CodeFamily::ServerError.defaults().to_vec(),
        }
    }
}
