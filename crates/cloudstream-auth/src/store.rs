//! Access key storage for signature verification

use crate::error::AuthError;
use cloudstream_common::Credentials;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory map from access key identifier to credentials
#[derive(Debug, Default)]
pub struct CredentialStore {
    keys: RwLock<HashMap<String, Credentials>>,
}

impl CredentialStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace credentials, keyed by their access key identifier
    pub fn insert(&self, credentials: Credentials) {
        self.keys
            .write()
            .insert(credentials.access_key_id().to_string(), credentials);
    }

    /// Look up the credentials for an access key
    pub fn lookup(&self, access_key_id: &str) -> Result<Credentials, AuthError> {
        self.keys
            .read()
            .get(access_key_id)
            .cloned()
            .ok_or_else(|| AuthError::AccessKeyNotFound(access_key_id.to_string()))
    }
}
