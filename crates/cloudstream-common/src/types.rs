//! Core type definitions for cloudstream

use derive_more::Display;
use std::fmt;

/// Resource path of an object, always beginning with `/`
///
/// The path has the form `/bucket/object-key`. It is signed verbatim, so it
/// must not carry anything the URL parser would split off (query or
/// fragment).
#[derive(Clone, PartialEq, Eq, Hash, Display)]
#[display("{_0}")]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Normalize and validate a user-supplied path
    ///
    /// A missing leading `/` is added, so `foo/bar` and `/foo/bar` yield the
    /// same path.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ObjectPathError> {
        let path = path.as_ref();
        let normalized = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Self::validate(&normalized)?;
        Ok(Self(normalized))
    }

    /// Get the path as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bucket component (first path segment)
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.0[1..].split('/').next().unwrap_or_default()
    }

    fn validate(path: &str) -> Result<(), ObjectPathError> {
        if path.len() <= 1 {
            return Err(ObjectPathError::Empty);
        }
        if let Some(c) = path.chars().find(|c| matches!(c, '?' | '#') || c.is_control()) {
            return Err(ObjectPathError::InvalidChar(c));
        }
        Ok(())
    }
}

impl fmt::Debug for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectPath({:?})", self.0)
    }
}

impl AsRef<str> for ObjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when creating an object path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectPathError {
    #[error("object path cannot be empty")]
    Empty,
    #[error("object path contains invalid character {0:?}")]
    InvalidChar(char),
}
