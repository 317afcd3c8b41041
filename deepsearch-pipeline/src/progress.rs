//! Progress reporting for a deep-search run.
//!
//! The orchestrator emits [`ProgressEvent`]s to a [`ProgressSink`] so that a
//! presentation layer can show them without the pipeline printing anything.

use std::fmt;

/// A step of a deep-search run. Rounds are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started,
    RoundStarted { round: usize, query: String },
    /// `new_results` counts only results whose URL was not seen before.
    RoundCompleted { round: usize, new_results: usize },
    NoResults { round: usize },
    Analyzing { total: usize },
    Completed { rounds: usize, total: usize },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "Starting deep search"),
            Self::RoundStarted { round: 1, .. } => write!(f, "Round 1: Initial search"),
            Self::RoundStarted { round, query } => write!(f, "Round {round}: Deep search - '{query}'"),
            Self::RoundCompleted { round: 1, new_results } => write!(f, "Found {new_results} results"),
            Self::RoundCompleted { new_results, .. } => write!(f, "Found {new_results} new results"),
            Self::NoResults { .. } => write!(f, "No new results found"),
            Self::Analyzing { total } => write!(f, "Analyzing {total} total results..."),
            Self::Completed { rounds, total } => {
                write!(f, "Completed {rounds} rounds with {total} results")
            }
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: &ProgressEvent);
}

/// Records events as tracing output only.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn emit(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::RoundStarted { round, query } => {
                tracing::info!(target: "pipeline.progress", round, "pipeline.round.start");
                tracing::debug!(
                    target: "pipeline.progress",
                    round,
                    query = %deepsearch_common::log_snippet(query),
                    "pipeline.round.query"
                );
            }
            ProgressEvent::RoundCompleted { round, new_results } => {
                tracing::info!(target: "pipeline.progress", round, new_results, "pipeline.round.complete");
            }
            ProgressEvent::NoResults { round } => {
                tracing::info!(target: "pipeline.progress", round, "pipeline.round.empty");
            }
            other => tracing::info!(target: "pipeline.progress", event = %other, "pipeline.progress"),
        }
    }
}
