//! Error types for attribution parsing
//!
//! Nothing here escapes the public API: every failure is contained locally
//! (a malformed deep link degrades to an empty parameter set, a malformed
//! percent-escape drops a single fragment pair). The type exists so internal
//! helpers can use `?` and so diagnostics carry a reason.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttributionError {
    #[error("Invalid percent-encoding: {0}")]
    InvalidEncoding(String),

    #[error("Malformed deeplink: {0}")]
    MalformedDeeplink(String),
}

pub type Result<T> = std::result::Result<T, AttributionError>;
