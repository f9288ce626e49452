//! Errors raised at the fetch boundary.

use thiserror::Error;

/// Why a backend read failed.
///
/// Both variants are handled the same way by the view state: logged, and the
/// affected source keeps whatever it showed before.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not complete, or the backend answered with a
    /// non-success status.
    #[error("network failure fetching {url}: {reason}")]
    NetworkFailure { url: String, reason: String },

    /// The body arrived but did not have the expected shape.
    #[error("malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },
}

impl FetchError {
    pub fn network(url: &str, reason: impl ToString) -> Self {
        FetchError::NetworkFailure {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(url: &str, reason: impl ToString) -> Self {
        FetchError::MalformedResponse {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Short tag used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::NetworkFailure { .. } => "network_failure",
            FetchError::MalformedResponse { .. } => "malformed_response",
        }
    }
}
