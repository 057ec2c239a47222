//! Upload body pipe
//!
//! A background task reads the upload source and pushes chunks into a
//! bounded channel; the receiving end is the HTTP request body. The channel
//! bound gives backpressure: the pump never runs more than
//! `PIPE_CAPACITY` chunks ahead of what the HTTP client has taken.

use bytes::Bytes;
use futures::StreamExt;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// Chunks buffered between the pump and the request body
pub const PIPE_CAPACITY: usize = 16;

/// Handle to the task feeding an upload body
pub struct UploadPipe {
    pump: JoinHandle<u64>,
    failure: Arc<Mutex<Option<io::Error>>>,
}

impl UploadPipe {
    /// Start pumping `input` into a streaming request body
    ///
    /// The returned body has no known length, so it is sent with chunked
    /// transfer encoding.
    pub fn spawn<R>(input: R) -> (reqwest::Body, Self)
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let (tx, rx) = mpsc::channel::<io::Result<Bytes>>(PIPE_CAPACITY);
        let failure = Arc::new(Mutex::new(None));
        let pump = tokio::spawn(pump(input, tx, Arc::clone(&failure)));

        let body = reqwest::Body::wrap_stream(ReceiverStream::new(rx));
        (body, Self { pump, failure })
    }

    /// Take the source read error, if the pump hit one
    ///
    /// The error is recorded before the request body is failed, so once the
    /// HTTP client reports a body error this is already populated.
    pub fn take_failure(&self) -> Option<io::Error> {
        self.failure.lock().take()
    }

    /// Wait for the pump and return the number of bytes it forwarded
    pub async fn finish(self) -> io::Result<u64> {
        let sent = self.pump.await.map_err(io::Error::other)?;
        match self.failure.lock().take() {
            Some(err) => Err(err),
            None => Ok(sent),
        }
    }

    /// Stop the pump without waiting for it
    pub fn abort(&self) {
        self.pump.abort();
    }
}

async fn pump<R>(
    input: R,
    tx: mpsc::Sender<io::Result<Bytes>>,
    failure: Arc<Mutex<Option<io::Error>>>,
) -> u64
where
    R: AsyncRead + Send + Unpin,
{
    let mut chunks = ReaderStream::new(input);
    let mut sent = 0u64;

    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(bytes) => {
                let len = bytes.len() as u64;
                if tx.send(Ok(bytes)).await.is_err() {
                    debug!("Upload body dropped after {} bytes", sent);
                    return sent;
                }
                sent += len;
            }
            Err(err) => {
                warn!("Upload source failed after {} bytes: {}", sent, err);
                let forwarded = io::Error::new(err.kind(), err.to_string());
                *failure.lock() = Some(err);
                // Fails the request body; the receiver may already be gone
                let _ = tx.send(Err(forwarded)).await;
                return sent;
            }
        }
    }

    debug!("Upload source exhausted after {} bytes", sent);
    sent
}
