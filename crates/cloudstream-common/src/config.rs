//! Configuration for cloudstream
//!
//! The configuration lives in a flat, line-oriented file named
//! `cloudstream.conf`:
//!
//! ```text
//! # account used for interoperable access
//! accesskey ABCDEF0123456789
//! secret    long-secret-provided-by-the-service
//! endpoint  https://storage.googleapis.com
//! ```
//!
//! The file is looked up in the current directory, then in each parent
//! directory up to the root.

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Name of the configuration file searched for
pub const CONFIG_FILE_NAME: &str = "cloudstream.conf";

/// Service endpoint used when the file does not name one
pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// Access key identifier and signing secret
///
/// Immutable once loaded. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    secret: String,
}

impl Credentials {
    /// Create credentials from an access key identifier and secret
    pub fn new(access_key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret: secret.into(),
        }
    }

    /// Access key identifier, sent in clear in the authorization header
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Shared secret used as the HMAC key
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Root configuration, built once at startup and passed by reference
#[derive(Clone, Debug)]
pub struct Config {
    /// Signing credentials
    pub credentials: Credentials,
    /// Scheme and host of the storage service
    pub endpoint: Url,
}

impl Config {
    /// Create a configuration for the default endpoint
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
        }
    }

    /// Find `cloudstream.conf` starting at `start` and walking up to the root
    ///
    /// Only a missing file moves the search up a directory. Any other stat
    /// failure selects the candidate, so loading it reports the real error.
    pub fn discover(start: &Path) -> Result<PathBuf> {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            match std::fs::symlink_metadata(&candidate) {
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Ok(_) => {
                    debug!("Using config file {}", candidate.display());
                    return Ok(candidate);
                }
                Err(err) => {
                    debug!("Cannot stat {}: {}", candidate.display(), err);
                    return Ok(candidate);
                }
            }
        }
        Err(Error::ConfigNotFound(CONFIG_FILE_NAME))
    }

    /// Find and load the configuration, starting at the working directory
    pub fn discover_and_load() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|source| Error::ConfigIo {
            path: PathBuf::from("."),
            source,
        })?;
        Self::load(&Self::discover(&cwd)?)
    }

    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parse configuration text; `path` is only used in error messages
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let mut access_key_id = None;
        let mut secret = None;
        let mut endpoint = None;

        for (idx, line) in text.lines().enumerate() {
            let line = line.split_once('#').map_or(line, |(before, _)| before);
            let mut tokens = line.split_whitespace();
            let Some(directive) = tokens.next() else {
                continue;
            };
            let params: Vec<&str> = tokens.collect();

            let need = |n: usize| {
                if params.len() == n {
                    Ok(())
                } else {
                    Err(Error::BadParameters {
                        path: path.to_path_buf(),
                        line: idx + 1,
                        directive: directive.to_string(),
                        expected: n,
                        saw: params.len(),
                    })
                }
            };

            match directive {
                "accesskey" => {
                    need(1)?;
                    access_key_id = Some(params[0].to_string());
                }
                "secret" => {
                    need(1)?;
                    secret = Some(params[0].to_string());
                }
                "endpoint" => {
                    need(1)?;
                    endpoint = Some(parse_endpoint(params[0])?);
                }
                _ => {
                    return Err(Error::UnknownDirective {
                        path: path.to_path_buf(),
                        line: idx + 1,
                        directive: directive.to_string(),
                    });
                }
            }
        }

        let missing = |field| Error::MissingField {
            path: path.to_path_buf(),
            field,
        };
        let access_key_id = access_key_id.ok_or_else(|| missing("accesskey"))?;
        let secret = secret.ok_or_else(|| missing("secret"))?;

        let mut config = Self::new(Credentials::new(access_key_id, secret));
        if let Some(endpoint) = endpoint {
            config.endpoint = endpoint;
        }
        Ok(config)
    }

    /// Override the endpoint, e.g. from the command line
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = parse_endpoint(endpoint)?;
        Ok(self)
    }
}

/// Validate an endpoint URL: http(s), a host, and nothing after it
pub fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let trimmed = endpoint.trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| Error::invalid_endpoint(endpoint, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::invalid_endpoint(endpoint, "scheme must be http or https"));
    }
    if url.host_str().is_none() {
        return Err(Error::invalid_endpoint(endpoint, "missing host"));
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(Error::invalid_endpoint(
            endpoint,
            "endpoint must not include a path or query",
        ));
    }
    Ok(url)
}
