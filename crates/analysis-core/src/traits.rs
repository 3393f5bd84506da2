use async_trait::async_trait;
use crate::{AnalysisError, Bar, CandidateConfig, OptionsMetrics, SentimentSignal, SignalSource};

/// Loader for one sentiment channel. An empty result means "no data", not an error.
#[async_trait]
pub trait SignalLoader: Send + Sync {
    fn source(&self) -> SignalSource;

    async fn load(&self, symbol: &str, lookback_days: u32) -> Result<Vec<SentimentSignal>, AnalysisError>;
}

/// Aggregate options metrics at the current time
#[async_trait]
pub trait OptionsMetricsSource: Send + Sync {
    async fn metrics(&self, symbol: &str) -> Result<Option<OptionsMetrics>, AnalysisError>;
}

/// Daily price bars for the momentum analyzer
#[async_trait]
pub trait PriceHistorySource: Send + Sync {
    async fn bars(&self, symbol: &str, lookback_days: u32) -> Result<Vec<Bar>, AnalysisError>;
}

/// Best-effort per-instrument tuning. The engine clips whatever comes back and
/// falls back to defaults on `None` or an error.
#[async_trait]
pub trait ConfigAdvisor: Send + Sync {
    async fn suggest(&self, symbol: &str) -> Result<Option<CandidateConfig>, AnalysisError>;
}
