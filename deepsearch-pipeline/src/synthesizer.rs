//! The answer-generation primitive: a system instruction built around the
//! search context, one chat request, and a displayable failure message.

use std::sync::Arc;

use deepsearch_common::{Result, log_snippet};
use deepsearch_llm::LlmClient;

const SYSTEM_PROMPT_HEAD: &str = "You are an expert research assistant with access to comprehensive search data. \n\
Use the provided search context to give detailed, accurate, and well-structured responses.";

const SYSTEM_PROMPT_GUIDELINES: &str = "Guidelines:\n\
- Synthesize information from multiple sources\n\
- Cite key facts and findings\n\
- Identify any conflicting information\n\
- Provide comprehensive coverage of the topic\n\
- Structure your response clearly with sections if needed";

#[derive(Clone)]
pub struct AnswerSynthesizer {
    llm: Arc<dyn LlmClient + Send + Sync>,
    system_prompt_prefix: Option<String>,
}

impl AnswerSynthesizer {
    pub fn new(llm: Arc<dyn LlmClient + Send + Sync>) -> Self {
        Self {
            llm,
            system_prompt_prefix: None,
        }
    }

    /// Text placed before the system instruction, separated by a blank line.
    /// A blank prefix is ignored.
    #[must_use]
    pub fn with_system_prompt_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.system_prompt_prefix = (!prefix.trim().is_empty()).then_some(prefix);
        self
    }

    pub fn llm(&self) -> &Arc<dyn LlmClient + Send + Sync> {
        &self.llm
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// The system instruction carrying `context`.
    pub fn system_prompt(&self, context: &str) -> String {
        let body = format!(
            "{SYSTEM_PROMPT_HEAD}\n\nSearch Context:\n{context}\n\n{SYSTEM_PROMPT_GUIDELINES}"
        );
        match &self.system_prompt_prefix {
            Some(prefix) => format!("{prefix}\n\n{body}"),
            None => body,
        }
    }

    /// One generation request; failures are returned as errors.
    ///
    /// `None` leaves the temperature to the client's configured default.
    pub async fn try_generate(
        &self,
        prompt: &str,
        context: &str,
        temperature: Option<f32>,
    ) -> Result<String> {
        let system = self.system_prompt(context);
        tracing::debug!(
            target: "pipeline.synthesizer",
            prompt = %log_snippet(prompt),
            context_chars = context.chars().count(),
            temperature = ?temperature,
            "synthesizer.request"
        );
        let resp = self
            .llm
            .generate(prompt, Some(&system), None, temperature)
            .await?;
        Ok(resp.text)
    }

    /// One generation request. A failure becomes `"AI response failed: <cause>"`.
    pub async fn generate(&self, prompt: &str, context: &str, temperature: Option<f32>) -> String {
        match self.try_generate(prompt, context, temperature).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    target: "pipeline.synthesizer",
                    model = self.model_name(),
                    error = %e,
                    "synthesizer.degraded"
                );
                failure_message(&e)
            }
        }
    }
}

pub fn failure_message(cause: &dyn std::fmt::Display) -> String {
    format!("AI response failed: {cause}")
}
