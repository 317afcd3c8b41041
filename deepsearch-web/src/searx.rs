use crate::provider::SearchProvider;
use crate::types::{SearchResult, SearxResponse};
use async_trait::async_trait;
use deepsearch_common::{DeepSearchError, Result, log_snippet};
use deepsearch_http::{HttpClient, HttpError, RequestOpts};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::borrow::Cow;
use std::time::{Duration, Instant};

pub const DEFAULT_SEARX_URL: &str = "http://localhost:8080";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; DeepSearchBot/1.0)";
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(15);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for a SearXNG-compatible aggregator (`GET {base}/search?q=..&format=json`).
#[derive(Clone)]
pub struct SearxClient {
    http: HttpClient,
    user_agent: HeaderValue,
}

impl SearxClient {
    /// Create a client with the default user-agent and a 15 s timeout.
    ///
    /// ```
    /// use deepsearch_web::SearxClient;
    ///
    /// let client = SearxClient::new("http://localhost:8080").unwrap();
    /// assert_eq!(client.base_url(), "http://localhost:8080/");
    /// ```
    pub fn new(base_url: &str) -> Result<Self> {
        let http = HttpClient::new(base_url)
            .map_err(|e| DeepSearchError::Config(format!("search base URL: {e}")))?
            .with_timeout(DEFAULT_SEARCH_TIMEOUT);
        Ok(Self {
            http,
            user_agent: HeaderValue::from_static(DEFAULT_USER_AGENT),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Result<Self> {
        self.user_agent = HeaderValue::from_str(user_agent)
            .map_err(|e| DeepSearchError::Config(format!("invalid user agent: {e}")))?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url().as_str()
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers
    }

    async fn fetch(&self, query: &str, timeout: Option<Duration>) -> Result<SearxResponse> {
        self.http
            .get_json(
                "search",
                RequestOpts {
                    timeout,
                    headers: Some(self.headers()),
                    query: Some(vec![("q", Cow::Borrowed(query)), ("format", "json".into())]),
                    ..Default::default()
                },
            )
            .await
            .map_err(search_error)
    }

    /// Whether the aggregator answers a trivial query successfully.
    pub async fn probe(&self) -> bool {
        match self.fetch("test", Some(PROBE_TIMEOUT)).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(target: "web.searx", error = %e, "searx.probe.failed");
                false
            }
        }
    }
}

#[async_trait]
impl SearchProvider for SearxClient {
    async fn try_search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let started = Instant::now();
        tracing::debug!(
            target: "web.searx",
            query = %log_snippet(query),
            max_results,
            "searx.search.start"
        );

        let resp = self.fetch(query, None).await.inspect_err(|e| {
            tracing::warn!(
                target: "web.searx",
                query = %log_snippet(query),
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %e,
                "searx.search.error"
            );
        })?;

        let upstream = resp.results.len();
        let results: Vec<SearchResult> = resp
            .results
            .into_iter()
            .take(max_results)
            .map(SearchResult::from)
            .collect();

        tracing::info!(
            target: "web.searx",
            upstream,
            returned = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "searx.search.success"
        );
        Ok(results)
    }
}

fn search_error(e: HttpError) -> DeepSearchError {
    match e {
        HttpError::Api { status, .. } => {
            DeepSearchError::ProviderUnavailable(format!("search responded with status {status}"))
        }
        HttpError::Decode(msg, _) => DeepSearchError::MalformedResponse(msg),
        HttpError::Network(msg) => DeepSearchError::ProviderUnavailable(msg),
        other => DeepSearchError::ProviderUnavailable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_map_to_provider_unavailable() {
        let err = search_error(HttpError::Api {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            message: "down".into(),
        });
        assert!(err.is_provider_unavailable());
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn decode_errors_map_to_malformed_response() {
        let err = search_error(HttpError::Decode("expected value".into(), "<html>".into()));
        assert!(err.is_malformed_response());
    }

    #[test]
    fn custom_user_agent_is_validated() {
        let client = SearxClient::new(DEFAULT_SEARX_URL).unwrap();
        assert!(client.clone().with_user_agent("Bot/2.0").is_ok());
        assert!(client.with_user_agent("bad\nagent").is_err());
    }
}
