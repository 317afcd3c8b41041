//! Follow-up query generation from the first round of results.

use deepsearch_common::{Result, log_snippet};
use deepsearch_web::SearchResult;

use crate::context::clip_chars;
use crate::synthesizer::AnswerSynthesizer;

/// Upper bound on follow-up queries taken from one model reply.
pub const MAX_FOLLOW_UPS: usize = 4;

/// Suffixes appended to the original query when generation fails.
pub const FALLBACK_SUFFIXES: [&str; 3] = [
    "latest developments",
    "technical details",
    "alternatives comparison",
];

const SAMPLE_RESULTS: usize = 5;
const SAMPLE_CHARS: usize = 1000;
// A surviving line is strictly longer than this.
const MIN_QUERY_CHARS: usize = 10;

const PROMPT_INSTRUCTIONS: &str = "Generate 3-4 specific follow-up search queries that would provide deeper, more comprehensive information. Focus on:\n\
1. Technical details or specifics\n\
2. Recent developments or updates\n\
3. Different perspectives or approaches\n\
4. Related concepts or alternatives\n\
\n\
Return only the queries, one per line, without numbers or bullets.";

#[derive(Clone)]
pub struct QueryExpander {
    synthesizer: AnswerSynthesizer,
}

impl QueryExpander {
    pub fn new(synthesizer: AnswerSynthesizer) -> Self {
        Self { synthesizer }
    }

    /// Ask the model for follow-up queries; a failed call is an error.
    ///
    /// No results means no call and no queries.
    pub async fn try_expand(&self, original: &str, initial: &[SearchResult]) -> Result<Vec<String>> {
        if initial.is_empty() {
            return Ok(Vec::new());
        }
        let prompt = follow_up_prompt(original, initial);
        let reply = self
            .synthesizer
            .try_generate(&prompt, "", None)
            .await?;
        Ok(parse_follow_ups(&reply))
    }

    /// Follow-up queries for `original`, or the templated fallback when the model call fails.
    pub async fn expand(&self, original: &str, initial: &[SearchResult]) -> Vec<String> {
        match self.try_expand(original, initial).await {
            Ok(queries) => {
                tracing::debug!(
                    target: "pipeline.expander",
                    count = queries.len(),
                    "expander.generated"
                );
                queries
            }
            Err(e) => {
                tracing::warn!(
                    target: "pipeline.expander",
                    query = %log_snippet(original),
                    error = %e,
                    "expander.fallback"
                );
                fallback_queries(original)
            }
        }
    }
}

/// The instruction sent to the model, sampling the first few results.
pub fn follow_up_prompt(original: &str, initial: &[SearchResult]) -> String {
    let sample = initial
        .iter()
        .take(SAMPLE_RESULTS)
        .map(|r| format!("{} {}", r.title, r.content))
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "Based on the original query \"{original}\" and these search results:\n{}...\n\n{PROMPT_INSTRUCTIONS}",
        clip_chars(&sample, SAMPLE_CHARS)
    )
}

/// Trimmed reply lines longer than ten characters, at most [`MAX_FOLLOW_UPS`].
pub fn parse_follow_ups(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > MIN_QUERY_CHARS)
        .take(MAX_FOLLOW_UPS)
        .map(str::to_string)
        .collect()
}

pub fn fallback_queries(original: &str) -> Vec<String> {
    FALLBACK_SUFFIXES
        .iter()
        .map(|suffix| format!("{original} {suffix}"))
        .collect()
}
