//! Result records and the aggregator's wire shapes.

use serde::{Deserialize, Serialize};

/// A single normalized search result.
///
/// Every field is always present; values missing upstream default to the
/// empty string or `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub content: String,
    /// Dedup key within a deep-search run.
    pub url: String,
    /// Source identifier reported by the aggregator (may be empty).
    pub engine: String,
    pub score: f64,
}

impl SearchResult {
    /// Engine name used for grouping; an empty engine reads as `unknown`.
    pub fn engine_label(&self) -> &str {
        if self.engine.is_empty() {
            "unknown"
        } else {
            &self.engine
        }
    }
}

/// Top-level `format=json` response from a SearXNG-compatible aggregator.
///
/// Only `results` is read; a body without it is treated as zero results.
#[derive(Debug, Deserialize)]
pub struct SearxResponse {
    #[serde(default)]
    pub results: Vec<SearxHit>,
}

/// One raw entry of `results`; every field is optional upstream.
#[derive(Debug, Default, Deserialize)]
pub struct SearxHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

impl From<SearxHit> for SearchResult {
    fn from(hit: SearxHit) -> Self {
        Self {
            title: hit.title.unwrap_or_default(),
            content: hit.content.unwrap_or_default(),
            url: hit.url.unwrap_or_default(),
            engine: hit.engine.unwrap_or_default(),
            score: hit.score.unwrap_or_default(),
        }
    }
}
