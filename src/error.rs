//! Crate-level error type.

use crate::generators::CodeSetError;
use crate::http::HeaderError;
use crate::net::ListenerError;

/// Errors raised while building or running the servers.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("{0} listener already started")]
    AlreadyStarted(&'static str),

    #[error("{0} listener was stopped and cannot start again")]
    Stopped(&'static str),

    #[error("Invalid response header: {0}")]
    Header(#[from] HeaderError),

    #[error("Invalid status codes: {0}")]
    Codes(#[from] CodeSetError),
}
