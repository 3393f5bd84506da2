//! HTTP client for the optional per-ticker configuration advisor.
//!
//! The advisor is a best-effort collaborator: the scoring path never depends on
//! it, and any failure here ends in the static defaults.

pub mod error;

pub use error::{AdvisorError, AdvisorResult};

use analysis_core::{AnalysisError, CandidateConfig, ConfigAdvisor};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Configuration for the advisor service
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    /// `None` disables the advisor entirely
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AdvisorConfig {
    /// Read `CONFIG_ADVISOR_URL` and `CONFIG_ADVISOR_TIMEOUT_SECS`, loading `.env`
    /// first if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("CONFIG_ADVISOR_URL")
            .ok()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        let timeout_secs = std::env::var("CONFIG_ADVISOR_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Build a client when a URL is configured.
    pub fn client(&self) -> AdvisorResult<Option<ConfigAdvisorClient>> {
        match &self.base_url {
            Some(url) => Ok(Some(ConfigAdvisorClient::new(url.clone(), self.timeout)?)),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct SuggestRequest<'a> {
    symbol: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct SuggestResponse {
    #[serde(default)]
    config: Option<CandidateConfig>,
}

#[derive(Clone)]
pub struct ConfigAdvisorClient {
    client: reqwest::Client,
    base_url: String,
}

impl ConfigAdvisorClient {
    pub fn new(base_url: String, timeout: Duration) -> AdvisorResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Ask the advisor for a candidate config. `Ok(None)` when the advisor has
    /// no opinion on this symbol.
    pub async fn suggest_config(&self, symbol: &str) -> AdvisorResult<Option<CandidateConfig>> {
        let response = self
            .client
            .post(format!("{}/ticker-config", self.base_url))
            .json(&SuggestRequest { symbol })
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!("Config advisor has no suggestion for {}", symbol);
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AdvisorError::ServiceUnavailable(format!(
                "Status: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let parsed: SuggestResponse = serde_json::from_str(&body)
            .map_err(|e| AdvisorError::InvalidResponse(format!("{}: {}", e, body)))?;
        tracing::debug!("Config advisor suggestion for {}: {:?}", symbol, parsed.config);
        Ok(parsed.config)
    }
}

#[async_trait]
impl ConfigAdvisor for ConfigAdvisorClient {
    async fn suggest(&self, symbol: &str) -> Result<Option<CandidateConfig>, AnalysisError> {
        Ok(self.suggest_config(symbol).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ConfigAdvisorClient {
        ConfigAdvisorClient::new(server.uri(), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_suggest_parses_partial_config() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ticker-config"))
            .and(body_json(serde_json::json!({ "symbol": "NVDA" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "config": { "decay_half_life_days": 1.5, "divergence_threshold": 0.25 }
            })))
            .mount(&server)
            .await;

        let candidate = client_for(&server).await.suggest_config("NVDA").await.unwrap().unwrap();
        assert_eq!(candidate.decay_half_life_days, Some(1.5));
        assert_eq!(candidate.divergence_threshold, Some(0.25));
        assert_eq!(candidate.momentum_window_days, None);
    }

    #[tokio::test]
    async fn test_not_found_means_no_opinion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ticker-config"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = client_for(&server).await.suggest_config("XYZ").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ticker-config"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).await.suggest("XYZ").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Advisor(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ticker-config"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.suggest_config("XYZ").await.unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidResponse(_)));
    }

    #[test]
    fn test_disabled_without_url() {
        let config = AdvisorConfig::default();
        assert!(config.client().unwrap().is_none());
    }
}
