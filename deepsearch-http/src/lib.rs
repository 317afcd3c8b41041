//! JSON-over-HTTP for the search aggregator and the chat service.
//!
//! [`HttpClient`] is anchored to a base URL and makes exactly one attempt per
//! call. Each call gets a request id that ties its `tracing` events together:
//! `http.request.start`, `http.response.headers`, then either a decoded value
//! or one of `http.network_error`, `http.error`, `http.response.decode_error`.
//!
//! Bearer tokens and secret-looking query values never reach the logs. With
//! `DEEPSEARCH_HTTP_RAW=1` the request and response bodies are also logged
//! under target `http.raw`, with the same redaction applied.
//!
//! ```no_run
//! # async fn demo() -> Result<(), deepsearch_http::HttpError> {
//! use deepsearch_http::{HttpClient, RequestOpts};
//!
//! let client = HttpClient::new("http://localhost:8080")?;
//! let page: serde_json::Value = client.get_json("search", RequestOpts::default()).await?;
//! # Ok(()) }
//! ```

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::time::{Duration, Instant};
use thiserror::Error;

const RAW_ENV: &str = "DEEPSEARCH_HTTP_RAW";
const RAW_BODY_LIMIT: usize = 64 * 1024;
const SNIPPET_LIMIT: usize = 500;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const REDACTED: &str = "<redacted>";
const QUERY_VALUE_LIMIT: usize = 160;

/// Query keys whose values are replaced before logging.
const SECRET_QUERY_KEYS: &[&str] = &["api_key", "apikey", "key", "token", "access_token", "secret"];

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    /// Decoder message and a clipped copy of the body.
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}")]
    Api { status: StatusCode, message: String },
}

impl HttpError {
    /// HTTP status for [`HttpError::Api`], `None` otherwise.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// How a request authenticates.
///
/// ```
/// use deepsearch_http::Auth;
///
/// assert!(matches!(Auth::Bearer("token"), Auth::Bearer("token")));
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    Bearer(&'a str),
    None,
}

/// Per-request overrides. Everything unset falls back to the client.
///
/// ```
/// use deepsearch_http::RequestOpts;
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(5)),
///     query: Some(vec![("q", Cow::Borrowed("rust")), ("format", Cow::Borrowed("json"))]),
///     ..Default::default()
/// };
/// assert!(opts.auth.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Client rooted at `base`, with a 15 s default timeout.
    ///
    /// The base is treated as a directory, so a path prefix survives joins:
    /// `http://host/searx` + `search` is `http://host/searx/search`.
    ///
    /// ```
    /// use deepsearch_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("http://localhost:1234")?.with_timeout(Duration::from_secs(60));
    /// assert_eq!(client.default_timeout, Duration::from_secs(60));
    /// assert_eq!(client.base_url().as_str(), "http://localhost:1234/");
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = base.trim();
        let dir = if base.ends_with('/') {
            Cow::Borrowed(base)
        } else {
            Cow::Owned(format!("{base}/"))
        };
        let base = Url::parse(&dir).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.call(Method::GET, path, None, opts).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body).map_err(|e| HttpError::Build(e.to_string()))?;
        self.call(Method::POST, path, Some(payload), opts).await
    }

    async fn call<T>(
        &self,
        method: Method,
        path: &str,
        payload: Option<Vec<u8>>,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Url(e.to_string()))?;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        let trace = CallTrace::begin();

        trace.start(&method, &url, timeout, &opts, payload.as_deref());
        let request = self.prepare(method, url, timeout, payload, &opts)?;

        let resp = request.send().await.map_err(|e| trace.network("send", e))?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|e| trace.network("body", e))?;
        trace.response(status, &headers, &bytes);

        if !status.is_success() {
            return Err(trace.api_error(status, &bytes));
        }
        serde_json::from_slice(&bytes).map_err(|e| trace.decode_error(&e, &bytes))
    }

    fn prepare(
        &self,
        method: Method,
        url: Url,
        timeout: Duration,
        payload: Option<Vec<u8>>,
        opts: &RequestOpts<'_>,
    ) -> Result<RequestBuilder, HttpError> {
        let mut rb = self.inner.request(method, url).timeout(timeout);
        if let Some(query) = &opts.query {
            let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            rb = rb.query(&pairs);
        }
        if let Some(headers) = &opts.headers {
            rb = rb.headers(headers.clone());
        }
        if let Some(Auth::Bearer(token)) = &opts.auth {
            rb = rb.bearer_auth(sanitize_api_key(token)?);
        }
        if let Some(bytes) = payload {
            rb = rb.header(CONTENT_TYPE, "application/json").body(bytes);
        }
        Ok(rb)
    }
}

/// Request id and clock for one call; every log line of the call goes through it.
struct CallTrace {
    req_id: String,
    started: Instant,
}

impl CallTrace {
    fn begin() -> Self {
        Self {
            req_id: uuid::Uuid::new_v4().simple().to_string(),
            started: Instant::now(),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn start(
        &self,
        method: &Method,
        url: &Url,
        timeout: Duration,
        opts: &RequestOpts<'_>,
        payload: Option<&[u8]>,
    ) {
        let query: Vec<(&str, String)> = opts
            .query
            .iter()
            .flatten()
            .map(|(k, v)| (*k, redact_value(k, v)))
            .collect();
        let auth = match opts.auth {
            Some(Auth::Bearer(_)) => "bearer",
            _ => "none",
        };
        tracing::debug!(
            req_id = %self.req_id,
            %method,
            host = url.host_str().unwrap_or("-"),
            path = url.path(),
            ?query,
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            auth,
            has_body = payload.is_some(),
            "http.request.start"
        );
        if raw_enabled() {
            let body = payload
                .map(|b| clip(&String::from_utf8_lossy(b), RAW_BODY_LIMIT))
                .unwrap_or_default();
            tracing::debug!(target: "http.raw", req_id = %self.req_id, %method, path = url.path(), ?query, %body, "request");
        }
    }

    fn response(&self, status: StatusCode, headers: &HeaderMap, bytes: &[u8]) {
        tracing::debug!(
            req_id = %self.req_id,
            %status,
            elapsed_ms = self.elapsed_ms(),
            body_len = bytes.len(),
            "http.response.headers"
        );
        if raw_enabled() {
            tracing::debug!(
                target: "http.raw",
                req_id = %self.req_id,
                %status,
                headers = ?redact_headers(headers),
                body = %clip(&String::from_utf8_lossy(bytes), RAW_BODY_LIMIT),
                "response"
            );
        }
    }

    fn network(&self, stage: &'static str, err: reqwest::Error) -> HttpError {
        tracing::warn!(
            req_id = %self.req_id,
            stage,
            timeout = err.is_timeout(),
            elapsed_ms = self.elapsed_ms(),
            error = %err,
            "http.network_error"
        );
        HttpError::Network(err.to_string())
    }

    fn api_error(&self, status: StatusCode, bytes: &[u8]) -> HttpError {
        let message = error_message(bytes);
        tracing::warn!(req_id = %self.req_id, %status, %message, "http.error");
        HttpError::Api { status, message }
    }

    fn decode_error(&self, err: &serde_json::Error, bytes: &[u8]) -> HttpError {
        let snippet = snippet(bytes);
        tracing::warn!(
            req_id = %self.req_id,
            line = err.line(),
            column = err.column(),
            error = %err,
            body_snippet = %snippet,
            "http.response.decode_error"
        );
        HttpError::Decode(err.to_string(), snippet)
    }
}

fn raw_enabled() -> bool {
    std::env::var(RAW_ENV)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn redact_value(key: &str, value: &str) -> String {
    let key = key.to_ascii_lowercase();
    if SECRET_QUERY_KEYS.contains(&key.as_str()) {
        REDACTED.to_string()
    } else {
        clip(value, QUERY_VALUE_LIMIT)
    }
}

fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if name == AUTHORIZATION {
                REDACTED.to_string()
            } else {
                value.to_str().unwrap_or("<binary>").to_string()
            };
            (name.as_str().to_string(), shown)
        })
        .collect()
}

/// The most specific message a JSON error body offers, else a body snippet.
///
/// Understands `{"error":{"message":..}}`, `{"error":".."}`, `{"message":..}`
/// and `{"detail":..}`.
fn error_message(body: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) else {
        return snippet(body);
    };
    [
        value.pointer("/error/message"),
        value.get("error"),
        value.get("message"),
        value.get("detail"),
    ]
    .into_iter()
    .flatten()
    .filter_map(serde_json::Value::as_str)
    .find(|s| !s.is_empty())
    .map(str::to_string)
    .unwrap_or_else(|| snippet(body))
}

/// Clip to at most `max_bytes`, backing off to a char boundary.
fn clip(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

fn snippet(body: &[u8]) -> String {
    clip(&String::from_utf8_lossy(body), SNIPPET_LIMIT)
}

/// Strip quotes and whitespace a pasted key tends to carry; reject keys that
/// cannot form a header value.
fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    let key: String = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if !key.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII characters".into()));
    }
    HeaderValue::from_str(&format!("Bearer {key}"))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_keeps_its_path_prefix() {
        let client = HttpClient::new("http://host:8080/searx").unwrap();
        assert_eq!(client.base_url().as_str(), "http://host:8080/searx/");
        let joined = client.base_url().join("search").unwrap();
        assert_eq!(joined.as_str(), "http://host:8080/searx/search");
    }

    #[test]
    fn invalid_base_is_rejected() {
        assert!(matches!(HttpClient::new("not a url"), Err(HttpError::Url(_))));
    }

    #[test]
    fn secret_query_values_are_redacted() {
        assert_eq!(redact_value("api_key", "sk-123"), REDACTED);
        assert_eq!(redact_value("Token", "abc"), REDACTED);
        assert_eq!(redact_value("q", "rust"), "rust");
        assert_eq!(redact_value("q", &"a".repeat(200)).len(), QUERY_VALUE_LIMIT + 3);
    }

    #[test]
    fn authorization_header_is_redacted() {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_static("Bearer sk-live"));
        h.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let out = redact_headers(&h);
        assert!(out.contains(&("authorization".into(), REDACTED.into())));
        assert!(out.contains(&("content-type".into(), "application/json".into())));
    }

    #[test]
    fn error_message_reads_common_envelopes() {
        assert_eq!(error_message(br#"{"error":{"message":"model not loaded"}}"#), "model not loaded");
        assert_eq!(error_message(br#"{"error":"Too many requests"}"#), "Too many requests");
        assert_eq!(error_message(br#"{"detail":"busy"}"#), "busy");
        assert_eq!(error_message(b"plain text"), "plain text");
        assert_eq!(error_message(br#"{"other":1}"#), r#"{"other":1}"#);
    }

    #[test]
    fn clip_respects_char_boundaries() {
        assert_eq!(clip("ééé", 3), "é...");
        assert_eq!(clip("abc", 10), "abc");
    }

    #[test]
    fn api_key_is_cleaned() {
        assert_eq!(sanitize_api_key(" \"sk-abc\n\" ").unwrap(), "sk-abc");
        assert!(sanitize_api_key("sk-é").is_err());
    }
}
