use anyhow::Result;
use deepsearch_pipeline::{
    DeepSearchReport, NO_RESULTS_FOUND, ask_with_snippets, check_services, clamp_depth,
    quick_search,
};
use std::sync::Arc;

use crate::render::{self, ConsoleProgress};
use crate::wiring::Services;

/// One search, printed as snippets, then one answer over them.
pub async fn quick(services: &Services, query: &str) -> Result<()> {
    println!("\n🔍 Performing quick search...");
    let snippets = quick_search(
        services.searx.as_ref(),
        query,
        services.config.pipeline.quick_max_results,
    )
    .await;
    println!("\n🔎 Search Snippets:\n {snippets}");

    if snippets == NO_RESULTS_FOUND {
        println!("❌ No results found for your query.");
        return Ok(());
    }
    let answer = ask_with_snippets(&services.synthesizer, query, &snippets).await;
    println!("\n🤖 AI Answer:\n {answer}");
    Ok(())
}

pub async fn deep(services: &Services, query: &str, depth: usize) -> DeepSearchReport {
    let depth = clamp_depth(depth);
    println!("\n🎯 Performing deep search with {depth} rounds...");
    println!("🔍 Starting deep search for: '{query}'");
    let report = services
        .deep_search(Arc::new(ConsoleProgress))
        .run(query, depth)
        .await;
    render::report(&report);
    report
}

pub async fn models(services: &Services) -> Result<()> {
    let models = services.llm.list_models().await?;
    render::models(&models);
    Ok(())
}

pub async fn health(services: &Services, json: bool) -> Result<()> {
    let health = check_services(&services.searx, services.llm.as_ref()).await;
    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        render::health(&health);
    }
    Ok(())
}

pub fn show_config(services: &Services) -> Result<()> {
    print!("{}", services.config.to_redacted_yaml()?);
    Ok(())
}
