//! Internal failure taxonomy for remote routing calls.
//!
//! These errors never escape the public `RoutingClient` operations — every
//! variant is normalized into the same "service unavailable" condition that
//! triggers retry and then the local fallback.  The enum exists so retry
//! logging can say *why* an attempt failed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    /// Connection failure or timeout.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response body: {0}")]
    Malformed(String),

    /// The service answered but reported a non-"Ok" code.
    #[error("service error code {0:?}")]
    Service(String),
}

pub type RoutingResult<T> = Result<T, RoutingError>;
