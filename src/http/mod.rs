//! HTTP behavior subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted connection (net::listener)
//!     → routes.rs (path → Behavior, any method)
//!     → verbose.rs (optional timing log, same responses)
//!     → behavior.rs (FaultEngine: generators + configured headers/content)
//!     → headers.rs (configured Name:Value pairs)
//!     → Response to client
//! ```
//!
//! # Design Decisions
//! - Endpoint operations form one trait; decorators wrap any implementation
//! - Request-path operations never fail; bad input maps to a status code
//! - The engine is shared by every listener and every request

pub mod behavior;
pub mod headers;
pub mod routes;
pub mod verbose;

pub use behavior::{Behavior, BehaviorEngine, FaultEngine, SharedEngine};
pub use headers::{HeaderError, ResponseHeaders};
pub use verbose::VerboseEngine;

use std::sync::Arc;

use crate::config::BehaviorConfig;
use crate::error::ServerError;
use crate::generators::{Generators, RandomSource};

/// Build the engine every listener serves, wrapped in the verbose
/// decorator when `config.verbose` is set.
pub fn shared_engine(
    config: Arc<BehaviorConfig>,
    random: Arc<dyn RandomSource>,
) -> Result<SharedEngine, ServerError> {
    let generators = Generators::from_config(&config, random)?;
    let verbose = config.verbose;
    let engine = FaultEngine::new(config, generators)?;

    Ok(if verbose {
        Arc::new(VerboseEngine::new(engine))
    } else {
        Arc::new(engine)
    })
}
