use thiserror::Error;

/// Failures talking to the remote API. Both variants carry a message that is
/// ready to show to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The requested user, repository or commit does not exist upstream.
    #[error("{0}")]
    NotFound(String),

    /// Any other failure (HTTP status, transport, decoding).
    #[error("GitHub request failed: {0}")]
    Upstream(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

/// Failures of the local key-value storage. These never reach the user
/// directly; the favorites store logs them and carries on in memory.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local storage is not available")]
    Unavailable,

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored data is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}
