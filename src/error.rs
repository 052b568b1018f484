//! Error types for the record store.

use thiserror::Error;

/// Result alias used across the crate.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by tiers and the orchestrator.
///
/// An empty successful fetch ("no data anywhere") and a failed fetch ("could
/// not determine state") are distinct outcomes: only the latter produces a
/// `StoreError`. Tier errors are never retried or masked by the orchestrator;
/// they terminate the in-flight sequence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The local storage engine could not serve the request.
    #[error("local tier unavailable: {0}")]
    TierUnavailable(String),

    /// The remote authority could not be reached or rejected the request.
    #[error("remote request failed: {0}")]
    RemoteFailure(String),

    /// A collaborator was misconfigured at construction time. Fatal, never
    /// recovered.
    #[error("invalid store configuration: {0}")]
    PreconditionViolation(String),

    /// Operation declared for the repository capability set but with no
    /// committed semantics yet. Guaranteed to mutate nothing.
    #[error("operation `{0}` is reserved and not implemented")]
    Unsupported(&'static str),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::TierUnavailable(err.to_string())
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::RemoteFailure(err.to_string())
    }
}
