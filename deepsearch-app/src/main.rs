//! `deepsearch`: multi-round web search with an AI-synthesized answer.

mod commands;
mod interactive;
mod render;
mod wiring;

use anyhow::Result;
use clap::Parser;
use deepsearch_common::observability::{LogConfig, init_logging};
use std::path::PathBuf;

use interactive::parse_depth;
use wiring::Services;

/// Search a SearXNG instance, deepen with model-proposed follow-ups, and
/// synthesize an answer with a local OpenAI-compatible model.
#[derive(Parser, Debug)]
#[command(name = "deepsearch", version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to an optional deepsearch.yaml)
    #[arg(short, long, env = "DEEPSEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Duplicate log output to stderr
    #[arg(long)]
    log_stderr: bool,

    /// Runs the interactive prompts when omitted
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Single search with an answer over the top snippets
    Quick {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Multi-round search with follow-up queries and a synthesized answer
    Deep {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Search rounds, 2-5 (unparsable values use the configured default)
        #[arg(short, long)]
        depth: Option<String>,
        /// Also list every collected result
        #[arg(long)]
        details: bool,
    },
    /// List models offered by the AI service
    Models,
    /// Check reachability of the search and AI services
    Health {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = wiring::load_config(cli.config.as_deref())?;

    let log_path = init_logging(LogConfig {
        app_name: "deepsearch",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.emit_stderr || cli.log_stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.filter.clone(),
    })?;
    tracing::debug!(path = %log_path.display(), "app.logging.ready");

    let services = Services::from_config(cfg)?;

    match cli.command {
        Some(Command::Quick { query }) => commands::quick(&services, &query.join(" ")).await,
        Some(Command::Deep {
            query,
            depth,
            details,
        }) => {
            let default_depth = services.config.pipeline.default_depth;
            let depth = depth
                .as_deref()
                .map_or(default_depth, |raw| parse_depth(raw, default_depth));
            let report = commands::deep(&services, &query.join(" "), depth).await;
            if details {
                render::details(report.results.as_slice());
            }
            Ok(())
        }
        Some(Command::Models) => commands::models(&services).await,
        Some(Command::Health { json }) => commands::health(&services, json).await,
        Some(Command::Config) => commands::show_config(&services),
        None => interactive::run(&services).await,
    }
}
