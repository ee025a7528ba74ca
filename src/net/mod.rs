//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, one task per connection)
//!     → hyper-util auto builder (HTTP/1.1 or HTTP/2)
//!     → axum Router
//!
//! Listener States:
//!     Bound → Accepting → Closed (port released, open connections drain)
//! ```
//!
//! # Design Decisions
//! - A closed listener never accepts again; reopening means binding anew
//! - Closing does not wait for in-flight requests

pub mod listener;

pub use listener::{ListenerError, ServingListener};
