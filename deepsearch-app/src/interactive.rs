//! Prompt-driven flow used when no subcommand is given.

use anyhow::Result;
use deepsearch_pipeline::clamp_depth;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::commands;
use crate::render;
use crate::wiring::Services;

struct Prompter {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompter {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `message` and read one line; end of input reads as empty.
    async fn ask(&mut self, message: &str) -> Result<String> {
        print!("{message}");
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?.unwrap_or_default())
    }
}

/// Requested round count; blank or unparsable input falls back to `default`.
pub fn parse_depth(raw: &str, default: usize) -> usize {
    let raw = raw.trim();
    if raw.is_empty() {
        return clamp_depth(default);
    }
    match raw.parse::<i64>() {
        Ok(n) => clamp_depth(usize::try_from(n).unwrap_or(0)),
        Err(_) => clamp_depth(default),
    }
}

fn wants_details(answer: &str) -> bool {
    answer.trim().to_lowercase().starts_with('y')
}

pub async fn run(services: &Services) -> Result<()> {
    let mut prompter = Prompter::new();

    println!("🚀 DeepSearch Engine - Enhanced AI-Powered Search");
    println!("{}", "=".repeat(50));

    let mode = prompter
        .ask("Choose search mode:\n1. Quick search (default)\n2. Deep search (comprehensive)\nEnter choice (1 or 2): ")
        .await?;
    let query = prompter.ask("\nWhat do you want to search for? ").await?;

    if mode.trim() != "2" {
        return commands::quick(services, &query).await;
    }

    let default_depth = services.config.pipeline.default_depth;
    let raw = prompter
        .ask(&format!("Search depth (2-5 rounds, default {default_depth}): "))
        .await?;
    let depth = parse_depth(&raw, default_depth);

    let report = commands::deep(services, &query, depth).await;

    let answer = prompter.ask("\nShow detailed search results? (y/N): ").await?;
    if wants_details(&answer) {
        render::details(report.results.as_slice());
    }
    Ok(())
}
