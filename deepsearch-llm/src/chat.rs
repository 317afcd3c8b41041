use crate::config::ChatSettings;
use crate::traits::{LlmClient, LlmResponse, ModelInfo};
use async_trait::async_trait;
use deepsearch_common::{DeepSearchError, Result};
use deepsearch_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CHAT_PATH: &str = "v1/chat/completions";
const MODELS_PATH: &str = "v1/models";
const MODELS_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for any OpenAI-compatible `/v1/chat/completions` endpoint
/// (LM Studio, llama.cpp server, vLLM, gateways).
pub struct ChatCompletionsClient {
    client: HttpClient,
    settings: ChatSettings,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: i32,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<RawModel>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    id: String,
    #[serde(default)]
    object: Option<String>,
    #[serde(default)]
    created: Option<i64>,
    #[serde(default)]
    owned_by: Option<String>,
}

impl From<RawModel> for ModelInfo {
    fn from(raw: RawModel) -> Self {
        Self {
            id: raw.id,
            object: raw.object.unwrap_or_else(|| "model".to_string()),
            created: raw.created,
            owned_by: raw.owned_by.unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

impl ChatCompletionsClient {
    /// Create a client from connection settings. No network traffic happens here.
    pub fn new(settings: ChatSettings) -> Result<Self> {
        let client = HttpClient::new(&settings.base_url)
            .map_err(|e| DeepSearchError::Config(format!("AI base URL: {e}")))?
            .with_timeout(settings.timeout);
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    fn opts(&self, timeout: Option<Duration>) -> RequestOpts<'_> {
        RequestOpts {
            timeout,
            auth: self.settings.api_key.as_deref().map(Auth::Bearer),
            ..Default::default()
        }
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<i32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let req = ChatRequest {
            model: &self.settings.model,
            messages,
            temperature: temperature.unwrap_or(self.settings.temperature),
            max_tokens: max_tokens.unwrap_or(self.settings.max_tokens),
            stream: false,
        };

        tracing::debug!(
            target: "llm.chat",
            model = %self.settings.model,
            temperature = req.temperature,
            max_tokens = req.max_tokens,
            prompt_chars = prompt.chars().count(),
            "llm.chat.request"
        );

        let resp: ChatResponse = self
            .client
            .post_json(CHAT_PATH, &req, self.opts(None))
            .await
            .map_err(generation_error)?;

        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                DeepSearchError::MalformedResponse("response carried no message content".into())
            })?;

        let tokens_used = resp.usage.and_then(|u| u.total_tokens);
        tracing::debug!(
            target: "llm.chat",
            chars = text.chars().count(),
            ?tokens_used,
            "llm.chat.response"
        );

        Ok(LlmResponse {
            text,
            model: resp.model.or_else(|| Some(self.settings.model.clone())),
            tokens_used,
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let resp: ModelsResponse = self
            .client
            .get_json(MODELS_PATH, self.opts(Some(MODELS_TIMEOUT)))
            .await
            .map_err(generation_error)?;
        Ok(resp.data.into_iter().map(ModelInfo::from).collect())
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}

fn generation_error(e: HttpError) -> DeepSearchError {
    match e {
        HttpError::Decode(msg, _) => DeepSearchError::MalformedResponse(msg),
        HttpError::Build(msg) => DeepSearchError::Config(msg),
        other => DeepSearchError::GenerationFailure(other.to_string()),
    }
}
