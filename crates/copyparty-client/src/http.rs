//! The one HTTP helper every operation goes through.

use crate::config::ConnectionConfig;
use crate::error::{CopypartyError, Result};
use crate::redact::redact_url;
use reqwest::{Method, RequestBuilder, Response};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Client for one copyparty server.
///
/// Immutable after construction and cheap to clone.
#[derive(Clone)]
pub struct CopypartyClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ConnectionConfig,
    http: reqwest::Client,
}

/// Ordered query parameters. copyparty uses many value-less flags (`?ls`, `?delete`), which are
/// sent as `key=`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn flag(mut self, key: &str) -> Self {
        self.pairs.push((key.to_string(), String::new()));
        self
    }

    pub(crate) fn flag_if(self, cond: bool, key: &str) -> Self {
        if cond { self.flag(key) } else { self }
    }

    pub(crate) fn pair(mut self, key: &str, value: impl Into<String>) -> Self {
        self.pairs.push((key.to_string(), value.into()));
        self
    }

    pub(crate) fn pair_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.pair(key, v),
            None => self,
        }
    }

    fn encode(&self) -> Option<String> {
        if self.pairs.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .pairs
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    encode_component(k, false),
                    encode_component(v, false)
                )
            })
            .collect();
        Some(parts.join("&"))
    }
}

/// A successful (2xx) response with its body fully read.
#[derive(Debug, Clone)]
pub(crate) struct RemoteResponse {
    pub(crate) content_type: Option<String>,
    pub(crate) bytes: Vec<u8>,
}

impl RemoteResponse {
    pub(crate) fn content_type_or_default(&self) -> String {
        self.content_type
            .clone()
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string())
    }
}

impl CopypartyClient {
    /// Build a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: ConnectionConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(CopypartyError::from)?;
        Ok(Self {
            inner: Arc::new(ClientInner { config, http }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    /// Start a request to `<base_url><path>` with the query and credential applied.
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        query: &Query,
    ) -> Result<RequestBuilder> {
        let url = build_url(self.inner.config.base_url(), path, query)?;
        debug!(method = %method, url = %redact_url(&url), "copyparty request");
        Ok(self.authenticate(self.inner.http.request(method, url)))
    }

    fn authenticate(&self, request: RequestBuilder) -> RequestBuilder {
        match self.inner.config.password() {
            Some(password) => request.basic_auth("", Some(password)),
            None => request,
        }
    }

    /// Send a request, fail on non-2xx, and read the whole body.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<RemoteResponse> {
        let response = check_status(request.send().await?).await?;
        let content_type = content_type(&response);
        let bytes = response.bytes().await?.to_vec();
        Ok(RemoteResponse {
            content_type,
            bytes,
        })
    }

    /// Send a request and read whatever body arrives before `window` elapses.
    ///
    /// Used for endpoints that stream indefinitely (`?tail`). The status is still checked first.
    pub(crate) async fn send_windowed(
        &self,
        request: RequestBuilder,
        window: Duration,
    ) -> Result<RemoteResponse> {
        let mut response = check_status(request.send().await?).await?;
        let content_type = content_type(&response);

        // A window too large to represent means "until the server closes the stream".
        let deadline = tokio::time::Instant::now().checked_add(window);
        let mut bytes: Vec<u8> = Vec::new();
        loop {
            let next = response.chunk();
            let chunk = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, next).await {
                    Err(_) => break,
                    Ok(chunk) => chunk,
                },
                None => next.await,
            };
            match chunk.map_err(CopypartyError::from)? {
                Some(c) => bytes.extend_from_slice(&c),
                None => break,
            }
        }

        Ok(RemoteResponse {
            content_type,
            bytes,
        })
    }

    /// GET the base URL and report the HTTP status, without judging it.
    pub(crate) async fn probe_base(&self, timeout: Duration) -> Result<u16> {
        let url = Url::parse(self.inner.config.base_url())
            .map_err(|e| CopypartyError::Config(format!("Invalid copyparty URL: {e}")))?;
        let request = self.authenticate(self.inner.http.get(url)).timeout(timeout);
        let response = request.send().await?;
        Ok(response.status().as_u16())
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = redact_url(response.url());
    let bytes = response.bytes().await.map_err(CopypartyError::from)?;
    let body = String::from_utf8_lossy(&bytes).into_owned();
    warn!(status = status.as_u16(), url = %url, "copyparty request failed");
    Err(CopypartyError::Remote {
        status: status.as_u16(),
        body,
    })
}

fn content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Percent-encode everything except RFC 3986 unreserved bytes (and `/` in paths).
fn encode_component(s: &str, keep_slash: bool) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        let keep = matches!(
            b,
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~'
        ) || (keep_slash && b == b'/');
        if keep {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0F) as usize] as char);
        }
    }
    out
}

fn build_url(base_url: &str, path: &str, query: &Query) -> Result<Url> {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    let url = format!("{base_url}{}", encode_component(&path, true));
    let mut url = Url::parse(&url).map_err(|e| {
        CopypartyError::InvalidArgument(format!("Invalid URL for path '{path}': {e}"))
    })?;
    if let Some(q) = query.encode() {
        url.set_query(Some(&q));
    }
    Ok(url)
}
