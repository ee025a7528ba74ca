//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     stop() on the aggregate → DoneSignal fires → main returns
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → stop() on the aggregate
//! ```
//!
//! # Design Decisions
//! - The done signal fires once; late waiters return immediately

pub mod shutdown;
pub mod signals;

pub use shutdown::DoneSignal;
pub use signals::shutdown_signal;
