//! The iterative search-and-synthesis pipeline.
//!
//! One query becomes several search rounds: an initial search, model-proposed
//! follow-up searches merged without duplicate URLs, a compiled context, and a
//! final synthesized answer.
//!
//! - [`DeepSearch`]: the round loop, returning a [`DeepSearchReport`]
//! - [`QueryExpander`]: follow-up queries with a templated fallback
//! - [`context::compile`]: per-engine digest of the accumulated results
//! - [`AnswerSynthesizer`]: the answer-generation primitive
//! - [`quick`]: single-search helpers
//! - [`health`]: service reachability
//!
//! Each component degrades instead of failing: empty results, fallback
//! queries, or an `"AI response failed: ..."` answer. The strict `try_*`
//! variants expose the underlying error.

pub mod context;
pub mod expander;
pub mod health;
pub mod orchestrator;
pub mod pacing;
pub mod progress;
pub mod quick;
pub mod results;
pub mod synthesizer;

pub use expander::QueryExpander;
pub use health::{HealthStatus, ServiceHealth, check_services};
pub use orchestrator::{
    DEFAULT_DEPTH, DeepSearch, DeepSearchOptions, DeepSearchReport, MAX_DEPTH, MIN_DEPTH,
    NO_INITIAL_RESULTS, clamp_depth,
};
pub use pacing::{FixedDelay, NoDelay, RoundDelay};
pub use progress::{ProgressEvent, ProgressSink, TracingProgress};
pub use quick::{NO_RESULTS_FOUND, QUICK_MAX_RESULTS, ask_with_snippets, quick_search};
pub use results::ResultSet;
pub use synthesizer::AnswerSynthesizer;
