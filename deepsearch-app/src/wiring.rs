use anyhow::{Context, Result};
use deepsearch_config::{DeepSearchConfig, DeepSearchConfigLoader, default_config_paths};
use deepsearch_llm::{ChatSettings, LlmClient, connect};
use deepsearch_pipeline::{
    AnswerSynthesizer, DeepSearch, DeepSearchOptions, FixedDelay, ProgressSink,
};
use deepsearch_web::SearxClient;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// An explicit path must exist; otherwise each default location is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<DeepSearchConfig> {
    let loader = match explicit {
        Some(path) => DeepSearchConfigLoader::new().with_file(path),
        None => default_config_paths()
            .into_iter()
            .rev()
            .fold(DeepSearchConfigLoader::new(), |loader, path| {
                loader.with_optional_file(path)
            }),
    };
    loader.load().context("failed to load configuration")
}

/// Clients built once from configuration and shared by every command.
pub struct Services {
    pub config: DeepSearchConfig,
    pub searx: Arc<SearxClient>,
    pub llm: Arc<dyn LlmClient + Send + Sync>,
    pub synthesizer: AnswerSynthesizer,
}

impl Services {
    pub fn from_config(config: DeepSearchConfig) -> Result<Self> {
        let searx = SearxClient::new(&config.searx.base_url)?
            .with_timeout(Duration::from_secs(config.searx.timeout_secs))
            .with_user_agent(&config.searx.user_agent)?;

        let llm = connect(ChatSettings {
            base_url: config.ai.base_url.clone(),
            model: config.ai.model.clone(),
            api_key: config.ai.api_key.clone(),
            temperature: config.ai.temperature,
            max_tokens: config.ai.max_tokens,
            timeout: Duration::from_secs(config.ai.timeout_secs),
        })?;

        let mut synthesizer = AnswerSynthesizer::new(llm.clone());
        if let Some(prefix) = &config.ai.system_prompt_prefix {
            synthesizer = synthesizer.with_system_prompt_prefix(prefix.clone());
        }

        tracing::debug!(
            searx = %config.searx.base_url,
            ai = %config.ai.base_url,
            model = %config.ai.model,
            "app.services.ready"
        );

        Ok(Self {
            config,
            searx: Arc::new(searx),
            llm,
            synthesizer,
        })
    }

    pub fn deep_search(&self, progress: Arc<dyn ProgressSink>) -> DeepSearch {
        let p = &self.config.pipeline;
        DeepSearch::new(self.searx.clone(), self.synthesizer.clone())
            .with_options(DeepSearchOptions {
                initial_max_results: p.initial_max_results,
                follow_up_max_results: p.follow_up_max_results,
                synthesis_temperature: p.synthesis_temperature,
            })
            .with_delay(Arc::new(FixedDelay(Duration::from_millis(p.round_delay_ms))))
            .with_progress(progress)
    }
}
