//! HTTP transport
//!
//! Features:
//! - HTTP/2 negotiated adaptively, TLS 1.3 via rustls
//! - Brotli, Zstd, Gzip compression (auto-negotiated)
//! - Connection pooling with keep-alive
//! - Bodies exposed as async readers so JSON is decoded off the wire

use std::fmt;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio_util::io::{StreamReader, SyncIoBridge};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::HttpConfig;
use crate::error::{ResolveError, Result};

/// Streaming response body.
pub type Body = Box<dyn AsyncRead + Send + Unpin>;

/// A successful response: where it was actually served from, and its body.
pub struct FetchedPage {
    /// Final URL after any redirects the transport followed.
    pub url: Url,
    pub body: Body,
}

impl fmt::Debug for FetchedPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchedPage")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

/// Issues GET requests on behalf of the providers.
///
/// Implementations must be safe to share across concurrent resolutions.
/// Non-2xx responses are reported as [`ResolveError::Status`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<FetchedPage>;
}

/// reqwest-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        Self::from_config(&HttpConfig::default())
    }

    /// Create a client from transport settings
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            // Don't assume HTTP/2 - let server negotiate
            .http2_adaptive_window(true)
            // Keep connections alive for reuse across resolutions
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .brotli(true)
            .zstd(true)
            .gzip(true)
            .deflate(true)
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpClient {
    #[instrument(skip(self), fields(url = %url))]
    async fn get(&self, url: &Url) -> Result<FetchedPage> {
        debug!("Fetching");
        let response = self.client.get(url.clone()).send().await?;

        info!(
            status = %response.status(),
            version = ?response.version(),
            final_url = %response.url(),
            "Response received"
        );

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let final_url = response.url().clone();
        let stream = Box::pin(response.bytes_stream().map_err(io::Error::other));

        Ok(FetchedPage {
            url: final_url,
            body: Box::new(StreamReader::new(stream)),
        })
    }
}

/// Read at most `limit` bytes of a body as text.
///
/// Invalid UTF-8 is replaced rather than rejected; pages are only scanned
/// for meta tags.
pub async fn read_text(body: Body, limit: u64) -> Result<String> {
    let mut bytes = Vec::new();
    body.take(limit).read_to_end(&mut bytes).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Decode a JSON body straight from the stream.
///
/// The payload is never collected into a `String`; `serde_json` pulls bytes
/// through a blocking bridge on the blocking pool. Dropping the returned
/// future aborts the decode and releases the body.
pub async fn read_json<T>(body: Body) -> Result<T>
where
    T: DeserializeOwned + Send + 'static,
{
    let token = CancellationToken::new();
    let _abort_on_drop = token.clone().drop_guard();

    let reader = io::BufReader::new(SyncIoBridge::new(CancellableBody::new(body, token)));
    let value =
        tokio::task::spawn_blocking(move || serde_json::from_reader::<_, T>(reader)).await??;
    Ok(value)
}

/// Body that fails every read, and drops the underlying stream, once its
/// token is cancelled.
struct CancellableBody {
    inner: Option<Body>,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
}

impl CancellableBody {
    fn new(body: Body, token: CancellationToken) -> Self {
        Self {
            inner: Some(body),
            cancelled: Box::pin(token.cancelled_owned()),
        }
    }
}

impl AsyncRead for CancellableBody {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.inner.is_some() && this.cancelled.as_mut().poll(cx).is_ready() {
            this.inner = None;
        }

        match this.inner.as_mut() {
            Some(inner) => Pin::new(inner).poll_read(cx, buf),
            None => Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionAborted,
                "body read cancelled",
            ))),
        }
    }
}
