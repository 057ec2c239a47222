//! Transfer error types

use cloudstream_common::ObjectPathError;
use reqwest::StatusCode;
use thiserror::Error;

/// Result type for transfer operations
pub type Result<T> = std::result::Result<T, TransferError>;

/// Failure of a single GET or PUT
///
/// Every variant is terminal; nothing is retried.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("invalid object path: {0}")]
    InvalidPath(#[from] ObjectPathError),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("status: {status}")]
    Status { status: StatusCode },

    #[error("copying response body: {0}")]
    Body(#[source] std::io::Error),

    #[error("reading upload source: {0}")]
    Upload(#[source] std::io::Error),
}

impl TransferError {
    /// HTTP status of a rejected request
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        let err = TransferError::Status {
            status: StatusCode::FORBIDDEN,
        };
        assert_eq!(err.to_string(), "status: 403 Forbidden");
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));

        let err = TransferError::Upload(std::io::Error::other("broken pipe"));
        assert_eq!(err.to_string(), "reading upload source: broken pipe");
        assert_eq!(err.status(), None);
    }
}
