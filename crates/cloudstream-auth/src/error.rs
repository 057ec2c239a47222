//! Authentication error types

use thiserror::Error;

/// Signature verification errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingAuthHeader,

    #[error("invalid authorization header format")]
    InvalidAuthHeader,

    #[error("invalid signature version: expected AWS")]
    InvalidSignatureVersion,

    #[error("access key not found: {0}")]
    AccessKeyNotFound(String),

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("request has expired")]
    RequestExpired,

    #[error("invalid date format")]
    InvalidDateFormat,

    #[error("missing date header")]
    MissingDateHeader,
}

impl AuthError {
    /// S3 error code reported to clients for this failure
    #[must_use]
    pub const fn s3_error_code(&self) -> &'static str {
        match self {
            Self::AccessKeyNotFound(_) => "InvalidAccessKeyId",
            Self::SignatureMismatch => "SignatureDoesNotMatch",
            Self::RequestExpired => "RequestTimeTooSkewed",
            Self::MissingAuthHeader
            | Self::InvalidAuthHeader
            | Self::InvalidSignatureVersion
            | Self::InvalidDateFormat
            | Self::MissingDateHeader => "AccessDenied",
        }
    }
}
