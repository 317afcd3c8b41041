use async_trait::async_trait;
use deepsearch_common::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
}

/// A model advertised by the language-model service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub object: String,
    pub created: Option<i64>,
    pub owned_by: String,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt with optional system prompt.
    ///
    /// `None` for `max_tokens` or `temperature` means the client's configured default.
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<i32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse>;

    /// Models the service can serve.
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(Vec::new())
    }

    /// `true` when the model listing answers.
    async fn health_check(&self) -> Result<bool> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(
                    target: "llm",
                    model = self.model_name(),
                    error = %e,
                    "llm.health_check.failed"
                );
                Ok(false)
            }
        }
    }

    /// Model id sent with every completion request.
    fn model_name(&self) -> &str;
}
