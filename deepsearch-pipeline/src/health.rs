//! Reachability report for the search aggregator and the model service.

use std::time::{Duration, Instant};

use deepsearch_llm::LlmClient;
use deepsearch_web::SearxClient;
use serde::Serialize;

const MODEL_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceHealth {
    pub status: HealthStatus,
    pub search: bool,
    pub ai: bool,
    pub elapsed_ms: u64,
}

/// Probe both services. Only the search aggregator decides the status; the
/// model service is optional.
pub async fn check_services(searx: &SearxClient, llm: &dyn LlmClient) -> ServiceHealth {
    let started = Instant::now();
    let search = searx.probe().await;
    let ai = matches!(
        tokio::time::timeout(MODEL_PROBE_TIMEOUT, llm.health_check()).await,
        Ok(Ok(true))
    );
    let status = if search {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::info!(target: "pipeline.health", %status, search, ai, elapsed_ms, "health.checked");
    ServiceHealth {
        status,
        search,
        ai,
        elapsed_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        let health = ServiceHealth {
            status: HealthStatus::Degraded,
            search: false,
            ai: true,
            elapsed_ms: 12,
        };
        let v = serde_json::to_value(&health).unwrap();
        assert_eq!(v["status"], "degraded");
        assert_eq!(v["ai"], true);
        assert_eq!(HealthStatus::Healthy.to_string(), "healthy");
    }
}
