//! Availability control subsystem.
//!
//! # Data Flow
//! ```text
//! aggregate.rs (ServerAggregate: start/stop every member, one done signal)
//!     → harness.rs (manual kill: /dead_or_alive → down → dead_time → up)
//!     → jitter.rs (timer: up ⇄ down every jitter_interval)
//!         → net::listener (bind / close)
//!         → state.rs (published AvailabilityState)
//!
//! States:
//!     Up → GoingDown → Down → Restarting → Up
//! ```
//!
//! # Design Decisions
//! - Each controller's state is owned by one task; other tasks send it commands
//! - Stop is final: no timer or kill can bring a stopped listener back
//! - Restarts rebind the address the first bind resolved to

pub mod aggregate;
pub mod harness;
pub mod jitter;
pub mod state;

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::ServerError;

pub use aggregate::ServerAggregate;
pub use harness::{HarnessServer, KILL_PATH};
pub use jitter::JitterServer;
pub use state::{AvailabilityState, StateCell};

/// A listener whose availability is managed by a policy.
#[async_trait]
pub trait AvailabilityController: Send + Sync {
    /// Short label used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Bind and begin serving. Fails if the address cannot be bound.
    async fn start(&self) -> Result<(), ServerError>;

    /// Take the listener down for good. Calling it again is a no-op.
    async fn stop(&self) -> Result<(), ServerError>;

    fn state(&self) -> AvailabilityState;

    fn subscribe(&self) -> watch::Receiver<AvailabilityState>;

    /// Address of the first successful bind, if any.
    fn local_addr(&self) -> Option<SocketAddr>;
}
