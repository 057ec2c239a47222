//! Cloudstream Common - Shared types and utilities
//!
//! This crate provides the object path type, the credentials and
//! configuration loaded from `cloudstream.conf`, and the common error type
//! used by the signer, the transfer client and the binary.

pub mod config;
pub mod error;
pub mod types;

pub use config::{CONFIG_FILE_NAME, Config, Credentials, DEFAULT_ENDPOINT};
pub use error::{Error, Result};
pub use types::{ObjectPath, ObjectPathError};
