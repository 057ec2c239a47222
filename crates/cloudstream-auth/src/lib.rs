//! Cloudstream request signing
//!
//! This crate provides:
//! - The canonical message of the S3 REST authentication scheme
//!   (signature version 2)
//! - `RequestSigner`, producing `AWS <AccessKeyId>:<Signature>` headers
//! - `SigV2Verifier`, the matching server-side check, backed by an
//!   in-memory `CredentialStore`
//!
//! # Example
//!
//! ```rust,ignore
//! use cloudstream_auth::{RequestSigner, Verb};
//! use cloudstream_common::Credentials;
//!
//! let signer = RequestSigner::new(Credentials::new("AKID", "secret"));
//! let signed = signer.sign_request(Verb::Get, "/mybucket/greeting.txt");
//! // send `signed.date` as the Date header and
//! // `signed.authorization` as the Authorization header
//! ```

pub mod error;
pub mod sigv2;
pub mod store;

pub use error::AuthError;
pub use sigv2::{
    CanonicalMessage, RequestDate, RequestSigner, SigV2Verifier, SignedRequest, Verb,
    compute_signature,
};
pub use store::CredentialStore;
