//! Signed streaming GET and PUT
//!
//! Each call goes through the same steps: normalize the path, capture one
//! timestamp, sign, send, then relay the response body. A 200 body goes to
//! the output sink; any other status sends the body to the error sink and
//! fails with the status line.

use crate::error::{Result, TransferError};
use crate::pipe::UploadPipe;
use cloudstream_auth::{RequestSigner, SignedRequest, Verb};
use cloudstream_common::{Config, ObjectPath};
use futures::TryStreamExt;
use http::header::{AUTHORIZATION, DATE};
use reqwest::StatusCode;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::io::StreamReader;
use tracing::{debug, warn};
use url::Url;

/// Client for one storage endpoint and one set of credentials
#[derive(Debug, Clone)]
pub struct TransferClient {
    http: reqwest::Client,
    endpoint: Url,
    signer: RequestSigner,
}

impl TransferClient {
    /// Create a client from the loaded configuration
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cloudstream/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http_client(config, http))
    }

    /// Create a client around an existing HTTP client
    #[must_use]
    pub fn with_http_client(config: &Config, http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint: config.endpoint.clone(),
            signer: RequestSigner::new(config.credentials.clone()),
        }
    }

    /// Download `path`, writing the object to `out`
    ///
    /// Returns the number of bytes written. On a non-200 response the body
    /// is written to `err_out` instead and the status is returned as an
    /// error.
    pub async fn get<O, E>(&self, path: &str, out: &mut O, err_out: &mut E) -> Result<u64>
    where
        O: AsyncWrite + Unpin,
        E: AsyncWrite + Unpin,
    {
        let (url, signed) = self.prepare(Verb::Get, path)?;

        debug!("Sending GET {}", signed.resource);
        let response = self.request(url, &signed).send().await?;
        relay(response, out, err_out).await
    }

    /// Upload everything read from `input` to `path`
    ///
    /// The body is streamed with chunked transfer encoding while `input` is
    /// still being read; no `Content-Length` is sent. Returns the number of
    /// bytes uploaded.
    pub async fn put<R, O, E>(
        &self,
        path: &str,
        input: R,
        out: &mut O,
        err_out: &mut E,
    ) -> Result<u64>
    where
        R: AsyncRead + Send + Unpin + 'static,
        O: AsyncWrite + Unpin,
        E: AsyncWrite + Unpin,
    {
        let (url, signed) = self.prepare(Verb::Put, path)?;
        let (body, pipe) = UploadPipe::spawn(input);

        debug!("Sending PUT {}", signed.resource);
        let outcome = match self.request(url, &signed).body(body).send().await {
            Ok(response) => relay(response, out, err_out).await,
            Err(err) => Err(err.into()),
        };

        match outcome {
            Ok(_) => pipe.finish().await.map_err(TransferError::Upload),
            Err(err) => {
                pipe.abort();
                // A failed source read surfaces as a body error on the request;
                // report the read error itself
                Err(pipe.take_failure().map_or(err, TransferError::Upload))
            }
        }
    }

    /// Normalize the path, build the URL and sign what will be sent
    fn prepare(&self, verb: Verb, path: &str) -> Result<(Url, SignedRequest)> {
        let path = ObjectPath::new(path)?;
        let mut url = self.endpoint.clone();
        url.set_path(path.as_str());

        // Sign the path exactly as it goes on the wire (after URL encoding)
        let signed = self.signer.sign_request(verb, url.path());
        debug!(
            "Signed {} {} in bucket {} as {}",
            verb,
            signed.resource,
            path.bucket(),
            self.signer.access_key_id()
        );
        Ok((url, signed))
    }

    fn request(&self, url: Url, signed: &SignedRequest) -> reqwest::RequestBuilder {
        self.http
            .request(signed.verb.into(), url)
            .header(DATE, signed.date.as_str())
            .header(AUTHORIZATION, &signed.authorization)
    }
}

/// Copy the response body to `out` on 200, otherwise to `err_out`
async fn relay<O, E>(response: reqwest::Response, out: &mut O, err_out: &mut E) -> Result<u64>
where
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    let status = response.status();
    debug!("Response status: {}", status);

    let body = StreamReader::new(response.bytes_stream().map_err(io::Error::other));
    tokio::pin!(body);

    if status == StatusCode::OK {
        let copied = tokio::io::copy(&mut body, out)
            .await
            .map_err(TransferError::Body)?;
        out.flush().await.map_err(TransferError::Body)?;
        debug!("Relayed {} bytes", copied);
        return Ok(copied);
    }

    // The error document is diagnostic only; the status is what fails the call
    match tokio::io::copy(&mut body, err_out).await {
        Ok(_) => {
            if let Err(err) = err_out.flush().await {
                warn!("Failed to flush error body: {}", err);
            }
        }
        Err(err) => warn!("Failed to relay error body: {}", err),
    }
    Err(TransferError::Status { status })
}
