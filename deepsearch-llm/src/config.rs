use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection and sampling defaults for an OpenAI-compatible chat service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    pub base_url: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub temperature: f32,
    /// `-1` asks the service for unbounded output.
    pub max_tokens: i32,
    pub timeout: Duration,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            base_url: crate::DEFAULT_AI_URL.to_string(),
            model: crate::DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: crate::DEFAULT_TEMPERATURE,
            max_tokens: crate::UNBOUNDED_TOKENS,
            timeout: crate::DEFAULT_GENERATION_TIMEOUT,
        }
    }
}
