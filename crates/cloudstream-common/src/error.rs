//! Error types for cloudstream
//!
//! Configuration and endpoint errors shared by every component.

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for cloudstream operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for cloudstream
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not find {0}")]
    ConfigNotFound(&'static str),

    #[error("reading {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "{}:{line}: bad parameters for {directive:?}, expected {expected}, saw {saw}",
        .path.display()
    )]
    BadParameters {
        path: PathBuf,
        line: usize,
        directive: String,
        expected: usize,
        saw: usize,
    },

    #[error("{}:{line}: bad config command {directive:?}", .path.display())]
    UnknownDirective {
        path: PathBuf,
        line: usize,
        directive: String,
    },

    #[error("missing {field} in {}", .path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl Error {
    /// Create an invalid endpoint error
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}
