//! Error types for all marketvault operations.

use thiserror::Error;

/// Errors that can occur while fetching, normalizing or caching market data.
///
/// Propagation policy: errors local to one ticker in a batch call are caught
/// by the facade, logged, and converted into an omission; credential errors
/// are fatal at session construction; "expected missing" sub-fields surface
/// as `Ok(None)` at the facade, not as errors.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The credential bag (cookie + crumb) could not be obtained.
    /// Fatal at initialization - no retry.
    #[error("Authentication failed: {message}")]
    Auth {
        /// What went wrong while acquiring the session
        message: String,
    },

    /// The remote endpoint answered with a non-2xx status or reported an
    /// error in its envelope.
    #[error("Remote error ({status}): {message}")]
    Remote {
        /// HTTP status code, or 0 when the failure is envelope-level
        status: u16,
        /// Error description, provider-supplied when available
        message: String,
    },

    /// The response body could not be parsed into the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A requested entity (document, metric, section) is absent from the
    /// cache. The facade converts this to a logged warning plus `None`.
    #[error("Not found: {entity}")]
    NotFound {
        /// Description of the missing entity
        entity: String,
    },

    /// The document store failed; the operation is aborted for the
    /// affected ticker only.
    #[error("Store error: {0}")]
    Store(String),

    /// The caller supplied an invalid date range or parameter.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// A network-level error occurred while talking to the remote API.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Whether a retry of the same request could plausibly succeed:
    /// transport failures, throttling and server-side errors only.
    pub fn is_retryable(&self) -> bool {
        match self {
            MarketDataError::Network(_) => true,
            MarketDataError::Remote { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
