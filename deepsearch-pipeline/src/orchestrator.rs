//! The multi-round deep-search loop.

use std::sync::Arc;

use deepsearch_common::log_snippet;
use deepsearch_web::SearchProvider;

use crate::context;
use crate::expander::QueryExpander;
use crate::pacing::{FixedDelay, RoundDelay};
use crate::progress::{ProgressEvent, ProgressSink, TracingProgress};
use crate::results::ResultSet;
use crate::synthesizer::AnswerSynthesizer;

/// Answer returned when the first round finds nothing.
pub const NO_INITIAL_RESULTS: &str = "No initial results found.";

pub const MIN_DEPTH: usize = 2;
pub const MAX_DEPTH: usize = 5;
pub const DEFAULT_DEPTH: usize = 3;

/// Clamp a requested round count into `[MIN_DEPTH, MAX_DEPTH]`.
pub fn clamp_depth(depth: usize) -> usize {
    depth.clamp(MIN_DEPTH, MAX_DEPTH)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeepSearchOptions {
    pub initial_max_results: usize,
    pub follow_up_max_results: usize,
    pub synthesis_temperature: f32,
}

impl Default for DeepSearchOptions {
    fn default() -> Self {
        Self {
            initial_max_results: 8,
            follow_up_max_results: 6,
            synthesis_temperature: 0.5,
        }
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct DeepSearchReport {
    pub results: ResultSet,
    pub answer: String,
    /// Search rounds executed, the initial one included.
    pub rounds: usize,
}

impl DeepSearchReport {
    pub fn source_breakdown(&self) -> Vec<(String, usize)> {
        self.results.source_breakdown()
    }

    pub fn into_parts(self) -> (ResultSet, String) {
        (self.results, self.answer)
    }
}

/// Drives initial search, query expansion, follow-up rounds, context
/// compilation and final synthesis for one query at a time.
pub struct DeepSearch {
    search: Arc<dyn SearchProvider>,
    synthesizer: AnswerSynthesizer,
    expander: QueryExpander,
    delay: Arc<dyn RoundDelay>,
    progress: Arc<dyn ProgressSink>,
    options: DeepSearchOptions,
}

impl DeepSearch {
    pub fn new(search: Arc<dyn SearchProvider>, synthesizer: AnswerSynthesizer) -> Self {
        Self {
            search,
            expander: QueryExpander::new(synthesizer.clone()),
            synthesizer,
            delay: Arc::new(FixedDelay::default()),
            progress: Arc::new(TracingProgress),
            options: DeepSearchOptions::default(),
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Arc<dyn RoundDelay>) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: DeepSearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &DeepSearchOptions {
        &self.options
    }

    /// Run up to `max_depth` search rounds for `query` and synthesize an answer.
    ///
    /// `max_depth` is clamped into `[MIN_DEPTH, MAX_DEPTH]`. Every step degrades
    /// on failure instead of aborting; the only early exit is an empty first
    /// round, which returns no results and [`NO_INITIAL_RESULTS`].
    pub async fn run(&self, query: &str, max_depth: usize) -> DeepSearchReport {
        let depth = clamp_depth(max_depth);
        tracing::info!(target: "pipeline", depth, "pipeline.start");
        tracing::debug!(target: "pipeline", query = %log_snippet(query), "pipeline.query");
        self.emit(ProgressEvent::Started);

        self.emit(ProgressEvent::RoundStarted {
            round: 1,
            query: query.to_string(),
        });
        let initial = self
            .search
            .search(query, self.options.initial_max_results)
            .await;
        if initial.is_empty() {
            self.emit(ProgressEvent::NoResults { round: 1 });
            tracing::info!(target: "pipeline", "pipeline.abort.no_initial_results");
            return DeepSearchReport {
                results: ResultSet::new(),
                answer: NO_INITIAL_RESULTS.to_string(),
                rounds: 1,
            };
        }

        let mut results = ResultSet::new();
        let kept = results.merge(initial.iter().cloned());
        self.emit(ProgressEvent::RoundCompleted {
            round: 1,
            new_results: kept,
        });

        let follow_ups = self.expander.expand(query, &initial).await;
        let mut rounds = 1;
        for (round, follow_up) in (2..).zip(follow_ups.iter().take(depth - 1)) {
            self.emit(ProgressEvent::RoundStarted {
                round,
                query: follow_up.clone(),
            });
            self.delay.pause().await;

            let batch = self
                .search
                .search(follow_up, self.options.follow_up_max_results)
                .await;
            rounds = round;
            if batch.is_empty() {
                self.emit(ProgressEvent::NoResults { round });
                continue;
            }
            let added = results.merge(batch);
            self.emit(ProgressEvent::RoundCompleted {
                round,
                new_results: added,
            });
        }

        self.emit(ProgressEvent::Analyzing {
            total: results.len(),
        });
        let context = context::compile(results.as_slice());
        let answer = self
            .synthesizer
            .generate(
                &final_prompt(query),
                &context,
                Some(self.options.synthesis_temperature),
            )
            .await;

        self.emit(ProgressEvent::Completed {
            rounds,
            total: results.len(),
        });
        tracing::info!(target: "pipeline", rounds, total = results.len(), "pipeline.complete");

        DeepSearchReport {
            results,
            answer,
            rounds,
        }
    }

    fn emit(&self, event: ProgressEvent) {
        self.progress.emit(&event);
    }
}

/// The synthesis request for the accumulated context.
pub fn final_prompt(query: &str) -> String {
    format!(
        "Based on my deep search research, provide a comprehensive answer to: \"{query}\"\n\
\n\
Consider:\n\
- Key facts and findings from multiple sources\n\
- Recent developments and current state\n\
- Different perspectives or approaches\n\
- Technical details and practical implications\n\
- Any limitations or conflicting information\n\
\n\
Provide a well-structured, thorough response that synthesizes all the gathered information."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::NoDelay;
    use async_trait::async_trait;
    use deepsearch_common::{DeepSearchError, Result};
    use deepsearch_llm::{LlmClient, LlmResponse};
    use deepsearch_web::SearchResult;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn hit(url: &str, engine: &str) -> SearchResult {
        SearchResult {
            title: format!("title {url}"),
            content: format!("content {url}"),
            url: url.to_string(),
            engine: engine.to_string(),
            score: 1.0,
        }
    }

    /// Canned results per query; unknown queries fail.
    #[derive(Default)]
    struct FakeSearch {
        answers: HashMap<String, Vec<SearchResult>>,
        calls: Mutex<Vec<(String, usize)>>,
    }

    impl FakeSearch {
        fn with(mut self, query: &str, results: Vec<SearchResult>) -> Self {
            self.answers.insert(query.to_string(), results);
            self
        }
    }

    #[async_trait]
    impl SearchProvider for FakeSearch {
        async fn try_search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), max_results));
            self.answers
                .get(query)
                .map(|r| r.iter().take(max_results).cloned().collect())
                .ok_or_else(|| DeepSearchError::ProviderUnavailable("status 503".into()))
        }
    }

    /// First call answers with follow-ups, later calls with the final answer.
    struct FakeLlm {
        follow_ups: Option<&'static str>,
        calls: Mutex<Vec<(String, Option<String>, Option<f32>)>>,
    }

    impl FakeLlm {
        fn new(follow_ups: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                follow_ups,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmClient for FakeLlm {
        async fn generate(
            &self,
            prompt: &str,
            system_prompt: Option<&str>,
            _max_tokens: Option<i32>,
            temperature: Option<f32>,
        ) -> Result<LlmResponse> {
            let first = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((prompt.to_string(), system_prompt.map(str::to_string), temperature));
                calls.len() == 1
            };
            let text = if first {
                self.follow_ups
                    .ok_or_else(|| DeepSearchError::GenerationFailure("refused".into()))?
                    .to_string()
            } else {
                "final answer".to_string()
            };
            Ok(LlmResponse {
                text,
                model: None,
                tokens_used: None,
            })
        }

        fn model_name(&self) -> &str {
            "fake"
        }
    }

    #[derive(Default)]
    struct Collect(Mutex<Vec<ProgressEvent>>);

    impl ProgressSink for Collect {
        fn emit(&self, event: &ProgressEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    fn pipeline(search: Arc<FakeSearch>, llm: Arc<FakeLlm>) -> DeepSearch {
        DeepSearch::new(search, AnswerSynthesizer::new(llm)).with_delay(Arc::new(NoDelay))
    }

    #[test]
    fn depth_is_clamped() {
        assert_eq!(clamp_depth(0), 2);
        assert_eq!(clamp_depth(3), 3);
        assert_eq!(clamp_depth(9), 5);
    }

    #[tokio::test]
    async fn empty_initial_round_short_circuits() {
        let search = Arc::new(FakeSearch::default());
        let llm = FakeLlm::new(Some("never used query"));
        let report = pipeline(search.clone(), llm.clone()).run("rust", 3).await;

        assert!(report.results.is_empty());
        assert_eq!(report.answer, NO_INITIAL_RESULTS);
        assert_eq!(report.rounds, 1);
        assert!(llm.calls.lock().unwrap().is_empty());
        assert_eq!(search.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn follow_ups_are_limited_by_depth_and_deduplicated() {
        let search = Arc::new(
            FakeSearch::default()
                .with("rust", vec![hit("a", "bing"), hit("b", "bing")])
                .with("rust follow up one", vec![hit("b", "ddg"), hit("c", "ddg")])
                .with("rust follow up two", vec![hit("d", "ddg")])
                .with("rust follow up three", vec![hit("e", "ddg")]),
        );
        let llm = FakeLlm::new(Some(
            "rust follow up one\nrust follow up two\nrust follow up three",
        ));
        let progress = Arc::new(Collect::default());
        let report = pipeline(search.clone(), llm.clone())
            .with_progress(progress.clone())
            .run("rust", 3)
            .await;

        let urls: Vec<&str> = report.results.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, ["a", "b", "c", "d"]);
        assert_eq!(report.rounds, 3);
        assert_eq!(report.answer, "final answer");

        let calls = search.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                ("rust".to_string(), 8),
                ("rust follow up one".to_string(), 6),
                ("rust follow up two".to_string(), 6),
            ]
        );

        let events = progress.0.lock().unwrap();
        assert_eq!(events.first(), Some(&ProgressEvent::Started));
        assert!(events.contains(&ProgressEvent::RoundCompleted { round: 2, new_results: 1 }));
        assert_eq!(events.last(), Some(&ProgressEvent::Completed { rounds: 3, total: 4 }));
    }

    #[tokio::test]
    async fn synthesis_uses_compiled_context_and_lower_temperature() {
        let search = Arc::new(FakeSearch::default().with("rust", vec![hit("a", "bing")]));
        let llm = FakeLlm::new(Some("short"));
        let report = pipeline(search, llm.clone()).run("rust", 2).await;
        assert_eq!(report.rounds, 1);

        let calls = llm.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        let (expand_prompt, expand_system, expand_temp) = &calls[0];
        assert!(expand_prompt.starts_with("Based on the original query \"rust\""));
        assert!(expand_system.as_deref().unwrap().contains("Search Context:\n\n"));
        assert_eq!(*expand_temp, None);

        let (final_p, final_system, final_temp) = &calls[1];
        assert_eq!(final_p, &final_prompt("rust"));
        assert!(final_system.as_deref().unwrap().contains("=== BING RESULTS ==="));
        assert_eq!(*final_temp, Some(0.5));
    }

    #[tokio::test]
    async fn failed_expansion_falls_back_and_failed_rounds_continue() {
        let search = Arc::new(
            FakeSearch::default()
                .with("rust", vec![hit("a", "bing")])
                .with("rust technical details", vec![hit("a", "ddg"), hit("z", "ddg")]),
        );
        let progress = Arc::new(Collect::default());
        let report = pipeline(search.clone(), FakeLlm::new(None))
            .with_progress(progress.clone())
            .run("rust", 5)
            .await;

        let queried: Vec<String> = search.calls.lock().unwrap().iter().map(|c| c.0.clone()).collect();
        assert_eq!(
            queried,
            [
                "rust",
                "rust latest developments",
                "rust technical details",
                "rust alternatives comparison"
            ]
        );
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.rounds, 4);
        assert!(progress.0.lock().unwrap().contains(&ProgressEvent::NoResults { round: 2 }));
    }

    #[tokio::test]
    async fn report_exposes_breakdown_and_parts() {
        let search = Arc::new(
            FakeSearch::default().with("rust", vec![hit("a", "bing"), hit("b", ""), hit("c", "bing")]),
        );
        let report = pipeline(search, FakeLlm::new(Some("x"))).run("rust", 2).await;
        assert_eq!(
            report.source_breakdown(),
            vec![("bing".to_string(), 2), ("unknown".to_string(), 1)]
        );
        let (results, answer) = report.into_parts();
        assert_eq!(results.len(), 3);
        assert_eq!(answer, "final answer");
    }
}
