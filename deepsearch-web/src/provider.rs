//! The search seam used by the deep-search pipeline.

use async_trait::async_trait;
use deepsearch_common::{Result, log_snippet};

use crate::types::SearchResult;

/// A backend that turns a query into normalized results.
///
/// Implementors only provide [`SearchProvider::try_search`]; the degrading
/// [`SearchProvider::search`] wraps it so that no failure escapes.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one search round, surfacing provider failures as errors.
    ///
    /// At most `max_results` entries are returned, in upstream order.
    async fn try_search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;

    /// Run one search round; any failure is logged and yields no results.
    async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        match self.try_search(query, max_results).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(
                    target: "web.search",
                    query = %log_snippet(query),
                    error = %e,
                    "search.degraded.empty"
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepsearch_common::DeepSearchError;

    struct Failing;

    #[async_trait]
    impl SearchProvider for Failing {
        async fn try_search(&self, _query: &str, _max: usize) -> Result<Vec<SearchResult>> {
            Err(DeepSearchError::ProviderUnavailable("status 503".into()))
        }
    }

    struct Fixed(Vec<SearchResult>);

    #[async_trait]
    impl SearchProvider for Fixed {
        async fn try_search(&self, _query: &str, max: usize) -> Result<Vec<SearchResult>> {
            Ok(self.0.iter().take(max).cloned().collect())
        }
    }

    #[tokio::test]
    async fn failures_degrade_to_empty() {
        let provider = Failing;
        assert!(provider.try_search("q", 5).await.is_err());
        assert!(provider.search("q", 5).await.is_empty());
    }

    #[tokio::test]
    async fn successes_pass_through() {
        let hit = SearchResult {
            title: "t".into(),
            content: "c".into(),
            url: "https://a.com".into(),
            engine: "e".into(),
            score: 1.0,
        };
        let provider = Fixed(vec![hit.clone(), hit.clone()]);
        assert_eq!(provider.search("q", 1).await, vec![hit]);
    }
}
