//! Common types and utilities shared across DeepSearch crates.
//!
//! This crate defines the shared error taxonomy and the observability helpers
//! used throughout the DeepSearch workspace. It is intentionally lightweight
//! so that every crate can depend on it without heavy transitive costs.
//!
//! # Overview
//!
//! - [`DeepSearchError`] and [`Result`]: shared error handling
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`log_snippet`]: bounded rendering of user text for log fields
//!
//! # Examples
//!
//! ```rust
//! use deepsearch_common::DeepSearchError;
//!
//! let err = DeepSearchError::ProviderUnavailable("status 503".into());
//! assert_eq!(err.to_string(), "Search provider unavailable: status 503");
//! assert!(err.is_provider_unavailable());
//! ```

pub mod observability;

/// Maximum number of characters of user-supplied text placed in log fields.
pub const LOG_SNIPPET_CHARS: usize = 160;

/// Error types used across the DeepSearch system.
///
/// Components absorb these at their own boundary and convert them into a
/// degraded value; they surface as `Err` only from the strict `try_*`
/// operations.
#[derive(thiserror::Error, Debug)]
pub enum DeepSearchError {
    /// The search aggregator answered with a non-success status or could not be reached.
    #[error("Search provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A provider answered but the body could not be decoded.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The language-model call failed.
    #[error("Generation failed: {0}")]
    GenerationFailure(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DeepSearchError {
    pub fn is_provider_unavailable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_))
    }

    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }
}

/// Convenient alias for results that use [`DeepSearchError`].
pub type Result<T> = std::result::Result<T, DeepSearchError>;

/// Clip `text` to [`LOG_SNIPPET_CHARS`] characters, marking the cut with `…`.
///
/// ```rust
/// use deepsearch_common::log_snippet;
///
/// assert_eq!(log_snippet("short"), "short");
/// assert!(log_snippet(&"x".repeat(500)).ends_with('…'));
/// ```
pub fn log_snippet(text: &str) -> String {
    if text.chars().count() <= LOG_SNIPPET_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(LOG_SNIPPET_CHARS).collect();
    out.push('…');
    out
}
