//! Language-model access for DeepSearch.
//!
//! This crate exposes a common [`traits::LlmClient`] interface and a concrete
//! client for OpenAI-compatible chat-completions services. It also provides
//! a convenience function to build a shared client from [`ChatSettings`].
//!
//! # Examples
//! ```no_run
//! use deepsearch_common::Result;
//! use deepsearch_llm::{ChatSettings, connect};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let client = connect(ChatSettings::default())?;
//! let reply = client.generate("Say OK", None, Some(8), Some(0.1)).await?;
//! assert!(!reply.text.is_empty());
//! # Ok(())
//! # }
//! ```
pub mod chat;
pub mod config;
pub mod traits;

pub use chat::ChatCompletionsClient;
pub use config::ChatSettings;
pub use traits::{LlmClient, LlmResponse, ModelInfo};

use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_AI_URL: &str = "http://localhost:1234";
pub const DEFAULT_MODEL: &str = "qwen/qwen3-30b-a3b-2507";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const UNBOUNDED_TOKENS: i32 = -1;
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Build a shareable client for the configured chat service.
pub fn connect(
    settings: ChatSettings,
) -> deepsearch_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    let client = ChatCompletionsClient::new(settings)?;
    tracing::debug!(
        target: "llm.chat",
        base_url = %client.settings().base_url,
        model = %client.settings().model,
        "llm.client.ready"
    );
    Ok(Arc::new(client))
}
