//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (BehaviorConfig::default)
//!     → loader.rs (optional TOML file)
//!     → cli.rs (flags / FLAKY_* environment, highest precedence)
//!     → validation.rs (semantic checks, all errors at once)
//!     → BehaviorConfig (validated, immutable)
//!     → shared via Arc with the engine and every listener
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; nothing mutates it at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde, clap) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod size;
pub mod validation;

pub use cli::Args;
pub use loader::{load_config, resolve, ConfigError};
pub use schema::{BehaviorConfig, CodeSetConfig};
pub use size::ByteSize;
pub use validation::{validate_config, ValidationError};
