//! Sentiment fusion for a single instrument.
//!
//! `FusionEngine` is the synchronous scoring core. `SentimentFusionOrchestrator`
//! wraps it with the async collaborators: it loads every channel concurrently,
//! resolves the per-run config, and hands one `SignalBundle` to the engine.

pub mod alerts;
pub mod classification;
pub mod engine;
pub mod report;
pub mod resolver;

pub use alerts::{prioritize, Alert, AlertGenerator, AlertPriority, AlertType, AlertUrgency};
pub use classification::{classify, ClassificationBand, CLASSIFICATION_BANDS};
pub use engine::FusionEngine;
pub use report::{
    AdvancedMetrics, ChannelComponent, Classification, CompositeReport, ConfidenceLevel, DataDepth,
    FusionOutcome, NoDataReport, ReportMetadata,
};
pub use resolver::resolve_config;

use analysis_core::{
    Bar, ConfigAdvisor, OptionsMetrics, OptionsMetricsSource, PriceHistorySource, SentimentSignal,
    SignalBundle, SignalLoader, SignalSource,
};
use chrono::{DateTime, Utc};
use config_advisor::AdvisorConfig;
use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;

const DEFAULT_LOOKBACK_DAYS: u32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// How many days of signals each loader is asked for
    pub lookback_days: u32,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

#[derive(Default)]
pub struct SentimentFusionOrchestrator {
    settings: OrchestratorSettings,
    loaders: BTreeMap<SignalSource, Arc<dyn SignalLoader>>,
    options_metrics: Option<Arc<dyn OptionsMetricsSource>>,
    price_history: Option<Arc<dyn PriceHistorySource>>,
    /// Optional per-ticker config advisor
    advisor: Option<Arc<dyn ConfigAdvisor>>,
}

impl SentimentFusionOrchestrator {
    pub fn new(settings: OrchestratorSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Register a channel loader. A later loader for the same channel replaces
    /// the earlier one.
    pub fn with_loader(mut self, loader: Arc<dyn SignalLoader>) -> Self {
        self.loaders.insert(loader.source(), loader);
        self
    }

    pub fn with_options_metrics(mut self, source: Arc<dyn OptionsMetricsSource>) -> Self {
        self.options_metrics = Some(source);
        self
    }

    pub fn with_price_history(mut self, source: Arc<dyn PriceHistorySource>) -> Self {
        self.price_history = Some(source);
        self
    }

    pub fn with_advisor(mut self, advisor: Arc<dyn ConfigAdvisor>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    /// Attach the HTTP advisor when `CONFIG_ADVISOR_URL` is set.
    pub fn advisor_from_env(self) -> Self {
        match AdvisorConfig::from_env().client() {
            Ok(Some(client)) => {
                tracing::info!("Config advisor enabled");
                self.with_advisor(Arc::new(client))
            }
            Ok(None) => self,
            Err(e) => {
                tracing::warn!("Config advisor disabled, could not build client: {}", e);
                self
            }
        }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Analyze a symbol as of now.
    pub async fn analyze(&self, symbol: &str) -> FusionOutcome {
        self.analyze_as_of(symbol, Utc::now()).await
    }

    /// Analyze a symbol with signal ages measured from `as_of`.
    pub async fn analyze_as_of(&self, symbol: &str, as_of: DateTime<Utc>) -> FusionOutcome {
        tracing::info!(
            "Starting sentiment fusion for {} ({} loaders, lookback {} days)",
            symbol,
            self.loaders.len(),
            self.settings.lookback_days
        );

        let (news, options, analyst, financial, metrics, bars, config) = tokio::join!(
            self.load_channel(SignalSource::News, symbol),
            self.load_channel(SignalSource::Options, symbol),
            self.load_channel(SignalSource::Analyst, symbol),
            self.load_channel(SignalSource::Financial, symbol),
            self.load_options_metrics(symbol),
            self.load_price_history(symbol),
            resolve_config(symbol, self.advisor.as_deref()),
        );

        let mut bundle = SignalBundle::new(symbol, as_of);
        for (source, signals) in [
            (SignalSource::News, news),
            (SignalSource::Options, options),
            (SignalSource::Analyst, analyst),
            (SignalSource::Financial, financial),
        ] {
            if let Some(signals) = signals {
                bundle = bundle.with_channel(source, signals);
            }
        }
        if let Some(metrics) = metrics {
            bundle = bundle.with_options_metrics(metrics);
        }
        if let Some(bars) = bars {
            bundle = bundle.with_price_history(bars);
        }

        FusionEngine::new(config).fuse(&bundle)
    }

    /// Analyze many symbols concurrently. Output order matches input order.
    pub async fn analyze_batch<S: AsRef<str>>(&self, symbols: &[S]) -> Vec<FusionOutcome> {
        let as_of = Utc::now();
        self.analyze_batch_as_of(symbols, as_of).await
    }

    pub async fn analyze_batch_as_of<S: AsRef<str>>(
        &self,
        symbols: &[S],
        as_of: DateTime<Utc>,
    ) -> Vec<FusionOutcome> {
        let outcomes = join_all(
            symbols
                .iter()
                .map(|symbol| self.analyze_as_of(symbol.as_ref(), as_of)),
        )
        .await;

        let no_data = outcomes.iter().filter(|o| o.is_no_data()).count();
        tracing::info!(
            "Batch fusion complete: {} symbols, {} without data",
            outcomes.len(),
            no_data
        );
        outcomes
    }

    async fn load_channel(&self, source: SignalSource, symbol: &str) -> Option<Vec<SentimentSignal>> {
        let loader = self.loaders.get(&source)?;
        match loader.load(symbol, self.settings.lookback_days).await {
            Ok(signals) if signals.is_empty() => {
                tracing::debug!("{} channel empty for {}", source.as_str(), symbol);
                None
            }
            Ok(signals) => {
                tracing::debug!("{} channel: {} signals for {}", source.as_str(), signals.len(), symbol);
                Some(signals)
            }
            Err(e) => {
                tracing::warn!("{} channel unavailable for {}: {}", source.as_str(), symbol, e);
                None
            }
        }
    }

    async fn load_options_metrics(&self, symbol: &str) -> Option<OptionsMetrics> {
        let source = self.options_metrics.as_ref()?;
        match source.metrics(symbol).await {
            Ok(metrics) => metrics,
            Err(e) => {
                tracing::warn!("Options metrics unavailable for {}: {}", symbol, e);
                None
            }
        }
    }

    async fn load_price_history(&self, symbol: &str) -> Option<Vec<Bar>> {
        let source = self.price_history.as_ref()?;
        match source.bars(symbol, self.settings.lookback_days).await {
            Ok(bars) => Some(bars),
            Err(e) => {
                tracing::warn!("Price history unavailable for {}: {}", symbol, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{AnalysisError, CandidateConfig};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 16, 0, 0).unwrap()
    }

    struct StaticLoader {
        source: SignalSource,
        score: f64,
        count: usize,
        seen_lookback: AtomicU32,
    }

    impl StaticLoader {
        fn new(source: SignalSource, score: f64, count: usize) -> Arc<Self> {
            Arc::new(Self {
                source,
                score,
                count,
                seen_lookback: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl SignalLoader for StaticLoader {
        fn source(&self) -> SignalSource {
            self.source
        }

        async fn load(&self, symbol: &str, lookback_days: u32) -> Result<Vec<SentimentSignal>, AnalysisError> {
            self.seen_lookback.store(lookback_days, Ordering::SeqCst);
            if symbol == "EMPTY" {
                return Ok(Vec::new());
            }
            Ok((0..self.count)
                .map(|i| {
                    SentimentSignal::new(
                        format!("2024-06-0{}T12:00:00Z", 1 + i % 2),
                        self.source,
                        self.score,
                        0.8,
                        10,
                    )
                })
                .collect())
        }
    }

    struct FailingLoader(SignalSource);

    #[async_trait]
    impl SignalLoader for FailingLoader {
        fn source(&self) -> SignalSource {
            self.0
        }

        async fn load(&self, _symbol: &str, _lookback_days: u32) -> Result<Vec<SentimentSignal>, AnalysisError> {
            Err(AnalysisError::SourceUnavailable("upstream timeout".to_string()))
        }
    }

    struct PanicMetrics;

    #[async_trait]
    impl OptionsMetricsSource for PanicMetrics {
        async fn metrics(&self, _symbol: &str) -> Result<Option<OptionsMetrics>, AnalysisError> {
            Ok(Some(OptionsMetrics {
                avg_implied_volatility: Some(0.65),
                put_call_ratio: Some(1.3),
                put_call_oi_ratio: None,
            }))
        }
    }

    struct ShortHalfLife;

    #[async_trait]
    impl ConfigAdvisor for ShortHalfLife {
        async fn suggest(&self, _symbol: &str) -> Result<Option<CandidateConfig>, AnalysisError> {
            Ok(Some(CandidateConfig {
                decay_half_life_days: Some(1.0),
                ..Default::default()
            }))
        }
    }

    fn orchestrator() -> SentimentFusionOrchestrator {
        SentimentFusionOrchestrator::default()
            .with_loader(StaticLoader::new(SignalSource::News, 0.5, 6))
            .with_loader(StaticLoader::new(SignalSource::Options, 0.6, 3))
            .with_loader(Arc::new(FailingLoader(SignalSource::Analyst)))
    }

    #[tokio::test]
    async fn test_failed_channel_degrades() {
        let outcome = orchestrator().analyze_as_of("AAPL", as_of()).await;
        let report = outcome.report().unwrap();
        assert_eq!(report.metadata.channels_present, 2);
        let analyst = report.component(SignalSource::Analyst).unwrap();
        assert!(!analyst.present);
        assert_eq!(analyst.weight, 0.0);
        assert!(report.regime.is_none());
    }

    #[tokio::test]
    async fn test_all_channels_empty_is_no_data() {
        let outcome = orchestrator().analyze_as_of("EMPTY", as_of()).await;
        assert!(outcome.is_no_data());
    }

    #[tokio::test]
    async fn test_lookback_is_passed_to_loaders() {
        let news = StaticLoader::new(SignalSource::News, 0.1, 1);
        let orchestrator = SentimentFusionOrchestrator::new(OrchestratorSettings { lookback_days: 30 })
            .with_loader(news.clone());
        orchestrator.analyze_as_of("AAPL", as_of()).await;
        assert_eq!(news.seen_lookback.load(Ordering::SeqCst), 30);
    }

    #[tokio::test]
    async fn test_metrics_and_advisor_are_used() {
        let outcome = orchestrator()
            .with_options_metrics(Arc::new(PanicMetrics))
            .with_advisor(Arc::new(ShortHalfLife))
            .analyze_as_of("AAPL", as_of())
            .await;
        let report = outcome.into_report().unwrap();
        assert_eq!(report.metadata.config.decay_half_life_days, 1.0);
        let regime = report.regime.unwrap();
        assert_eq!(regime.state, market_regime_detector::RegimeState::Panic);
        assert!(report.alerts.iter().any(|a| a.alert_type == AlertType::Regime));
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_isolates_failures() -> anyhow::Result<()> {
        let outcomes = orchestrator()
            .analyze_batch_as_of(&["AAPL", "EMPTY", "MSFT"], as_of())
            .await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].symbol(), "AAPL");
        assert!(outcomes[1].is_no_data());
        assert_eq!(outcomes[2].symbol(), "MSFT");
        assert!(outcomes[2].report().is_some());

        let first = serde_json::to_string(&outcomes[0])?;
        let again = serde_json::to_string(&orchestrator().analyze_as_of("AAPL", as_of()).await)?;
        assert_eq!(first, again);
        Ok(())
    }
}
