//! Loader for DeepSearch settings with YAML + environment overlays.
//!
//! Sources merge in the order they are added, later ones winning, and the
//! `DEEPSEARCH__` environment overlay is always applied last. Nested keys use
//! `__` as separator, so `DEEPSEARCH__AI__MODEL` sets `ai.model`. After merging,
//! string values undergo `${VAR}` expansion. Every field has a default, so an
//! empty document (or no file at all) is a valid configuration.
//!
//! ```yaml
//! searx:
//!   base_url: http://localhost:8080
//! ai:
//!   base_url: http://localhost:1234
//!   model: qwen/qwen3-30b-a3b-2507
//!   api_key: ${LM_API_KEY}
//! pipeline:
//!   default_depth: 3
//! logging:
//!   format: json
//! ```
use config::{Config, ConfigError, Environment, File, FileFormat};
use deepsearch_common::observability::LogFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

const EXPANSION_PASSES: usize = 8;

/// File name looked up when no explicit config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "deepsearch.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepSearchConfig {
    pub searx: SearxSettings,
    pub ai: AiSettings,
    pub pipeline: PipelineSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearxSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SearxSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (compatible; DeepSearchBot/1.0)".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    /// `-1` leaves output length to the service.
    pub max_tokens: i32,
    pub timeout_secs: u64,
    pub system_prompt_prefix: Option<String>,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:1234".into(),
            model: "qwen/qwen3-30b-a3b-2507".into(),
            api_key: None,
            temperature: 0.7,
            max_tokens: -1,
            timeout_secs: 60,
            system_prompt_prefix: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub default_depth: usize,
    pub initial_max_results: usize,
    pub follow_up_max_results: usize,
    /// Pause before each follow-up round; `0` disables it.
    pub round_delay_ms: u64,
    pub synthesis_temperature: f32,
    pub quick_max_results: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            default_depth: 3,
            initial_max_results: 8,
            follow_up_max_results: 6,
            round_delay_ms: 1000,
            synthesis_temperature: 0.5,
            quick_max_results: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    pub emit_stderr: bool,
    /// Used when `RUST_LOG` is unset.
    pub filter: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            emit_stderr: false,
            filter: "info".into(),
            dir: None,
        }
    }
}

impl DeepSearchConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        if self.searx.base_url.trim().is_empty() {
            problems.push("searx.base_url must not be empty".to_string());
        }
        if self.ai.base_url.trim().is_empty() {
            problems.push("ai.base_url must not be empty".to_string());
        }
        if self.searx.timeout_secs == 0 {
            problems.push("searx.timeout_secs must be positive".to_string());
        }
        if self.ai.timeout_secs == 0 {
            problems.push("ai.timeout_secs must be positive".to_string());
        }
        for (name, cap) in [
            ("pipeline.initial_max_results", self.pipeline.initial_max_results),
            ("pipeline.follow_up_max_results", self.pipeline.follow_up_max_results),
            ("pipeline.quick_max_results", self.pipeline.quick_max_results),
        ] {
            if cap == 0 {
                problems.push(format!("{name} must be positive"));
            }
        }
        if !(2..=5).contains(&self.pipeline.default_depth) {
            problems.push(format!(
                "pipeline.default_depth must be within 2..=5, got {}",
                self.pipeline.default_depth
            ));
        }
        for (name, t) in [
            ("ai.temperature", self.ai.temperature),
            ("pipeline.synthesis_temperature", self.pipeline.synthesis_temperature),
        ] {
            if !(0.0..=2.0).contains(&t) {
                problems.push(format!("{name} must be within 0.0..=2.0, got {t}"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(problems.join("; ")))
        }
    }

    /// YAML rendering with the API key masked.
    pub fn to_redacted_yaml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        if shown.ai.api_key.is_some() {
            shown.ai.api_key = Some("***".into());
        }
        serde_yaml::to_string(&shown).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

/// Candidate config files, in lookup order: the working directory, then the
/// user config directory (`~/.config/deepsearch/` on Linux).
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("deepsearch").join(DEFAULT_CONFIG_FILE));
    }
    paths
}

/// Resolve `$VAR` and `${VAR}` in every string leaf. Values of expanded
/// variables are expanded again, up to a fixed number of passes; unknown
/// variables stay literal.
fn expand_placeholders(value: &mut Value) {
    match value {
        Value::String(text) if text.contains('$') => *text = expand_str(text),
        Value::Array(items) => items.iter_mut().for_each(expand_placeholders),
        Value::Object(fields) => fields.values_mut().for_each(expand_placeholders),
        _ => {}
    }
}

fn expand_str(raw: &str) -> String {
    let mut current = raw.to_owned();
    for _ in 0..EXPANSION_PASSES {
        match shellexpand::env(&current) {
            Ok(Cow::Owned(next)) if next != current => current = next,
            _ => break,
        }
    }
    current
}

/// Builder over the `config` crate (YAML sources + env overrides).
pub struct DeepSearchConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for DeepSearchConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DeepSearchConfigLoader {
    /// A loader with no file sources yet.
    ///
    /// ```
    /// use deepsearch_config::DeepSearchConfigLoader;
    ///
    /// let config = DeepSearchConfigLoader::new()
    ///     .with_yaml_str("pipeline:\n  default_depth: 4")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.pipeline.default_depth, 4);
    /// assert_eq!(config.searx.base_url, "http://localhost:8080");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a file that must exist; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML document.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge the sources, overlay `DEEPSEARCH__*` variables, expand `${VAR}`
    /// placeholders, then deserialize and validate.
    ///
    /// ```
    /// use deepsearch_config::DeepSearchConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOC_LM_KEY", "sk-from-env"); }
    ///
    /// let config = DeepSearchConfigLoader::new()
    ///     .with_yaml_str("ai:\n  api_key: \"${DOC_LM_KEY}\"")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.ai.api_key.as_deref(), Some("sk-from-env"));
    ///
    /// unsafe { std::env::remove_var("DOC_LM_KEY"); }
    /// ```
    pub fn load(self) -> Result<DeepSearchConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(Environment::with_prefix("DEEPSEARCH").separator("__"))
            .build()?;

        let mut tree: Value = cfg.try_deserialize()?;
        expand_placeholders(&mut tree);

        // Typed pass goes back through `config` so env strings coerce to
        // numbers and flags, and digit-only values stay valid strings.
        let config: DeepSearchConfig = Config::try_from(&tree)?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholder_in_the_middle_of_a_string() {
        temp_env::with_var("DS_FOO", Some("bar"), || {
            assert_eq!(expand_str("prefix-${DS_FOO}-suffix"), "prefix-bar-suffix");
        });
    }

    #[test]
    fn nested_values_are_walked() {
        temp_env::with_vars([("DS_HOST", Some("searx.lan")), ("DS_PORT", Some("8888"))], || {
            let mut tree = json!({
                "searx": { "base_url": "http://${DS_HOST}:${DS_PORT}" },
                "mirrors": ["http://$DS_HOST", 42, null]
            });
            expand_placeholders(&mut tree);
            assert_eq!(tree["searx"]["base_url"], "http://searx.lan:8888");
            assert_eq!(tree["mirrors"], json!(["http://searx.lan", 42, null]));
        });
    }

    #[test]
    fn variables_referring_to_variables_resolve() {
        temp_env::with_vars(
            [
                ("DS_INNER", Some("qux")),
                ("DS_MIDDLE", Some("mid-${DS_INNER}")),
                ("DS_OUTER", Some("start-${DS_MIDDLE}-end")),
            ],
            || assert_eq!(expand_str("X=${DS_OUTER}"), "X=start-mid-qux-end"),
        );
    }

    #[test]
    fn self_referencing_variables_terminate() {
        temp_env::with_vars([("DS_A", Some("${DS_B}")), ("DS_B", Some("${DS_A}"))], || {
            let out = expand_str("x=${DS_A}-y");
            assert!(out.starts_with("x=${DS_"));
            assert!(out.ends_with("}-y"));
        });
    }

    #[test]
    fn unset_variables_stay_literal() {
        assert_eq!(expand_str("hi-${DS_DOES_NOT_EXIST}"), "hi-${DS_DOES_NOT_EXIST}");
    }

    #[test]
    fn defaults_are_valid() {
        let config = DeepSearchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ai.max_tokens, -1);
        assert_eq!(config.pipeline.round_delay_ms, 1000);
    }

    #[test]
    fn validate_reports_every_problem() {
        let mut config = DeepSearchConfig::default();
        config.searx.base_url = " ".into();
        config.pipeline.default_depth = 7;
        config.pipeline.follow_up_max_results = 0;
        config.ai.temperature = 3.5;

        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("searx.base_url"));
        assert!(msg.contains("default_depth"));
        assert!(msg.contains("follow_up_max_results"));
        assert!(msg.contains("ai.temperature"));
    }

    #[test]
    fn redacted_yaml_masks_the_api_key() {
        let mut config = DeepSearchConfig::default();
        config.ai.api_key = Some("sk-secret".into());
        let yaml = config.to_redacted_yaml().unwrap();
        assert!(!yaml.contains("sk-secret"));
        assert!(yaml.contains("***"));
        assert!(yaml.contains("model: qwen/qwen3-30b-a3b-2507"));
    }

    #[test]
    fn lookup_starts_in_the_working_directory() {
        assert_eq!(default_config_paths()[0], PathBuf::from("deepsearch.yaml"));
    }
}
