//! Fault-injecting HTTP backend library.

pub mod availability;
pub mod config;
pub mod error;
pub mod generators;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use availability::{AvailabilityController, AvailabilityState, ServerAggregate};
pub use config::BehaviorConfig;
pub use error::ServerError;
pub use http::{shared_engine, FaultEngine, SharedEngine};
pub use lifecycle::DoneSignal;
