//! Flaky Backend
//!
//! An HTTP service that stands in for an unreliable dependency.
//!
//! # Architecture Overview
//!
//! ```text
//!   config (defaults → TOML file → env/flags)
//!      │
//!      ▼
//!   generators (codes, bodies, delays) ──▶ http::FaultEngine ──▶ VerboseEngine (optional)
//!                                                │
//!                        ┌───────────────────────┴──────────────────────┐
//!                        ▼                                              ▼
//!              availability::HarnessServer                  availability::JitterServer
//!              port, /dead_or_alive kill switch             jitter_port, timed up/down
//!                        └──────────────┬───────────────────────────────┘
//!                                       ▼
//!                          ServerAggregate (one done signal)
//!                                       ▲
//!                       lifecycle::signals (Ctrl+C, SIGTERM)
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;

use flaky_backend::availability::ServerAggregate;
use flaky_backend::config::{resolve, Args};
use flaky_backend::generators::ThreadRandom;
use flaky_backend::http::shared_engine;
use flaky_backend::lifecycle::shutdown_signal;
use flaky_backend::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init();

    tracing::info!("flaky-backend v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Arc::new(resolve(args)?);

    tracing::info!(
        harness_address = %config.harness_address(),
        jitter_address = %config.jitter_address(),
        jitter_interval = ?config.jitter_interval,
        dead_time = ?config.dead_time,
        verbose = config.verbose,
        "Configuration loaded"
    );

    if let Some(address) = &config.metrics_address {
        let address: SocketAddr = address.parse()?;
        metrics::init_metrics(address)?;
    }

    let engine = shared_engine(config.clone(), Arc::new(ThreadRandom))?;
    let aggregate = Arc::new(ServerAggregate::from_config(&config, engine));
    aggregate.start().await?;

    let stopper = aggregate.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        if let Err(e) = stopper.stop().await {
            tracing::error!(error = %e, "Shutdown finished with errors");
        }
    });

    aggregate.wait().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
