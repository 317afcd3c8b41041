//! Single-call helpers: one search rendered as snippets, one answer over them.

use deepsearch_web::{SearchProvider, SearchResult};

use crate::synthesizer::AnswerSynthesizer;

/// Rendered by [`quick_search`] when the search comes back empty.
pub const NO_RESULTS_FOUND: &str = "No results found.";

pub const QUICK_MAX_RESULTS: usize = 3;

/// Search once and render `"{title}: {content}"` lines.
pub async fn quick_search(search: &dyn SearchProvider, query: &str, max_results: usize) -> String {
    let results = search.search(query, max_results).await;
    tracing::info!(target: "pipeline.quick", results = results.len(), "quick.search.complete");
    render_snippets(&results)
}

pub fn render_snippets(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS_FOUND.to_string();
    }
    results
        .iter()
        .map(|r| format!("{}: {}", r.title, r.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Answer `prompt` with `snippets` as the search context, at the client's default temperature.
pub async fn ask_with_snippets(synthesizer: &AnswerSynthesizer, prompt: &str, snippets: &str) -> String {
    synthesizer.generate(prompt, snippets, None).await
}
