//! Wire-level error types.

use thiserror::Error;

/// Errors raised while parsing wire documents.
#[derive(Debug, Error)]
pub enum Error {
    /// A GUID string was malformed.
    #[error("invalid guid: {0}")]
    InvalidGuid(String),

    /// A value could not be represented on the wire.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}
