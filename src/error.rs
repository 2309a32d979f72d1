use thiserror::Error;

use crate::validation::ErrorSet;

/// Failure returned synchronously by `Record::save`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Validation left at least one error; nothing was committed, dispatched or
    /// published. Staged changes are kept so the caller can correct and retry.
    #[error("record is invalid: {0}")]
    Invalid(ErrorSet),
}

/// Failure delivered to a save/destroy `on_failure` callback.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PersistenceError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
    #[error("unexpected response body (expected an object): {0}")]
    UnexpectedResponse(String),
}

/// Failure reported by a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("request timed out")]
    Timeout,
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}
