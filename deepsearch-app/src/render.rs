//! Console output for reports, listings and progress.

use deepsearch_llm::ModelInfo;
use deepsearch_pipeline::context::clip_chars;
use deepsearch_pipeline::{DeepSearchReport, ProgressEvent, ProgressSink, ServiceHealth};
use deepsearch_web::SearchResult;

const DETAIL_CONTENT_CHARS: usize = 150;

/// Prints round progress as the run advances and mirrors it to tracing.
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn emit(&self, event: &ProgressEvent) {
        deepsearch_pipeline::TracingProgress.emit(event);
        match event {
            ProgressEvent::RoundStarted { .. } => println!("\n📍 {event}"),
            ProgressEvent::RoundCompleted { .. } | ProgressEvent::NoResults { .. } => {
                println!("   {event}")
            }
            ProgressEvent::Analyzing { .. } => println!("\n🔬 {event}"),
            ProgressEvent::Started | ProgressEvent::Completed { .. } => {}
        }
    }
}

pub fn report(report: &DeepSearchReport) {
    println!("\n📊 Search Summary:");
    println!("   Total results analyzed: {}", report.results.len());
    println!("   Search rounds: {}", report.rounds);
    let sources = report
        .source_breakdown()
        .into_iter()
        .map(|(engine, count)| format!("{engine}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    println!("   Sources: {sources}");

    println!("\n🤖 Comprehensive AI Analysis:\n");
    println!("{}", "=".repeat(60));
    println!("{}", report.answer);
    println!("{}", "=".repeat(60));
}

pub fn details(results: &[SearchResult]) {
    println!("\n📋 Detailed Results ({} items):", results.len());
    for (i, result) in results.iter().enumerate() {
        println!("\n{}. {}", i + 1, result.title);
        println!("   Source: {}", result.engine_label());
        println!("   URL: {}", result.url);
        if !result.content.is_empty() {
            println!("   Content: {}...", clip_chars(&result.content, DETAIL_CONTENT_CHARS));
        }
    }
}

pub fn models(models: &[ModelInfo]) {
    if models.is_empty() {
        println!("No models reported by the AI service.");
        return;
    }
    for model in models {
        println!("{}  ({}, owned by {})", model.id, model.object, model.owned_by);
    }
}

pub fn health(health: &ServiceHealth) {
    let mark = |up: bool| if up { "up" } else { "down" };
    println!("status: {}", health.status);
    println!("   search: {}", mark(health.search));
    println!("   ai:     {}", mark(health.ai));
    println!("   checked in {} ms", health.elapsed_ms);
}
