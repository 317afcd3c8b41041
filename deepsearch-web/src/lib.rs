//! Web search for DeepSearch.
//!
//! - [`SearxClient`]: one query against a SearXNG-compatible aggregator
//! - [`SearchProvider`]: the seam the pipeline searches through
//! - [`SearchResult`]: the normalized record every round produces
//!
//! Failures never escape [`SearchProvider::search`]: a non-success status, a
//! network error, or an undecodable body is logged and yields no results.
//! [`SearchProvider::try_search`] keeps them apart for callers that care.

pub mod provider;
pub mod searx;
pub mod types;

pub use provider::SearchProvider;
pub use searx::{DEFAULT_SEARX_URL, DEFAULT_USER_AGENT, SearxClient};
pub use types::SearchResult;
