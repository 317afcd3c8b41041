use std::sync::OnceLock;

use deepsearch_common::observability::{LogConfig, LogFormat};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let dir = tempfile::tempdir().map(|d| d.keep()).unwrap_or_default();
        let config = LogConfig {
            app_name: "deepsearch-tests",
            log_dir: Some(dir),
            emit_stderr: true,
            format: if std::env::var("DEEPSEARCH_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
        };

        deepsearch_common::observability::init_logging(config).unwrap_or_default()
    });
}
