//! Renders accumulated results into the text digest handed to the model.

use std::collections::HashMap;

use deepsearch_web::SearchResult;

/// Returned by [`compile`] when there is nothing to summarize.
pub const NO_RESULTS_CONTEXT: &str = "No search results available.";

/// Entries rendered per engine group.
pub const MAX_PER_ENGINE: usize = 5;

/// Characters of `content` kept per entry.
pub const CONTENT_CHARS: usize = 200;

/// Group `results` by engine and render each group.
///
/// Groups appear in first-seen order with entries in insertion order. Output
/// is a pure function of the input sequence.
///
/// ```
/// use deepsearch_pipeline::context::{compile, NO_RESULTS_CONTEXT};
///
/// assert_eq!(compile(&[]), NO_RESULTS_CONTEXT);
/// ```
pub fn compile(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS_CONTEXT.to_string();
    }

    let mut groups: Vec<(&str, Vec<&SearchResult>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for result in results {
        let engine = result.engine_label();
        let slot = *index.entry(engine).or_insert_with(|| {
            groups.push((engine, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(result);
    }

    let mut parts: Vec<String> = Vec::new();
    for (engine, entries) in groups {
        parts.push(format!("\n=== {} RESULTS ===", engine.to_uppercase()));
        for (i, result) in entries.iter().take(MAX_PER_ENGINE).enumerate() {
            parts.push(format!("{}. {}", i + 1, result.title));
            if !result.content.is_empty() {
                parts.push(format!("   {}...", clip_chars(&result.content, CONTENT_CHARS)));
            }
            parts.push(format!("   URL: {}", result.url));
            parts.push(String::new());
        }
    }
    parts.join("\n")
}

/// The first `max` characters of `text`.
pub fn clip_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
