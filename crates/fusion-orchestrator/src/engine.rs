//! Synchronous fusion core.
//!
//! `FusionEngine::fuse` turns one `SignalBundle` into one `FusionOutcome`. It does
//! no I/O and never reads the wall clock, so equal bundles and configs produce
//! equal reports.

use analysis_core::{math, SentimentSignal, SignalBundle, SignalSource, TickerConfig};
use catalyst_detector::CatalystDetector;
use market_regime_detector::MarketRegimeDetector;
use sentiment_analysis::{
    ConvictionScorer, DivergenceDetector, FearGreedAdjuster, SmartMomentumAnalyzer,
    TemporalDecayWeighter,
};
use std::collections::BTreeMap;

use crate::alerts::AlertGenerator;
use crate::classification::classify;
use crate::report::{
    AdvancedMetrics, ChannelComponent, CompositeReport, DataDepth, FusionOutcome, NoDataReport,
    ReportMetadata,
};

// Empirically tuned blend coefficients; candidates for recalibration.
pub const MOMENTUM_BOOST: f64 = 0.15;
pub const DIVERGENCE_PENALTY: f64 = 0.1;

pub const NEWS_PRIORITY: f64 = 0.8;
/// Multiplied by the institutional premium
pub const OPTIONS_PRIORITY: f64 = 1.0;
pub const ANALYST_PRIORITY: f64 = 0.9;
pub const FINANCIAL_PRIORITY: f64 = 0.7;

/// Implied volatility above this level lowers signal reliability
pub const IV_EXCESS_FLOOR: f64 = 0.4;

pub struct FusionEngine {
    config: TickerConfig,
    decay: TemporalDecayWeighter,
    momentum: SmartMomentumAnalyzer,
    divergence: DivergenceDetector,
    conviction: ConvictionScorer,
    fear_greed: FearGreedAdjuster,
    regime: MarketRegimeDetector,
    catalysts: CatalystDetector,
    alerts: AlertGenerator,
}

impl FusionEngine {
    /// Build an engine around a frozen config. Out-of-range values are clipped.
    pub fn new(config: TickerConfig) -> Self {
        let config = config.clipped();
        Self {
            config,
            decay: TemporalDecayWeighter::new(config.decay_half_life_days),
            momentum: SmartMomentumAnalyzer::new(config.momentum_window_days),
            divergence: DivergenceDetector::new(config.divergence_threshold),
            conviction: ConvictionScorer::new(),
            fear_greed: FearGreedAdjuster::default(),
            regime: MarketRegimeDetector::new(),
            catalysts: CatalystDetector::default(),
            alerts: AlertGenerator::new(),
        }
    }

    pub fn config(&self) -> &TickerConfig {
        &self.config
    }

    fn priority(&self, source: SignalSource) -> f64 {
        match source {
            SignalSource::News => NEWS_PRIORITY,
            SignalSource::Options => OPTIONS_PRIORITY * self.config.institutional_premium,
            SignalSource::Analyst => ANALYST_PRIORITY,
            SignalSource::Financial => FINANCIAL_PRIORITY,
        }
    }

    pub fn fuse(&self, bundle: &SignalBundle) -> FusionOutcome {
        let channels_present = bundle.channels_present();
        if channels_present == 0 {
            tracing::warn!("No signal channels available for {}", bundle.symbol);
            return FusionOutcome::NoData(NoDataReport {
                symbol: bundle.symbol.clone(),
                as_of: bundle.as_of,
                reason: "No signals from any channel".to_string(),
            });
        }

        let news = bundle.channel(SignalSource::News).unwrap_or(&[]);
        let options = bundle.channel(SignalSource::Options).unwrap_or(&[]);
        let decayed_news = self.decay.weigh(news, bundle.as_of);

        let mut components: Vec<ChannelComponent> = SignalSource::ALL
            .iter()
            .map(|source| {
                let signals = bundle.channel(*source);
                let sentiment = match (source, signals) {
                    (_, None) => 0.0,
                    (SignalSource::News, Some(_)) => decayed_news.weighted_sentiment,
                    (_, Some(signals)) => confidence_weighted_mean(signals),
                };
                let signals = signals.unwrap_or(&[]);
                let confidences: Vec<f64> = signals.iter().map(|s| s.bounded_confidence()).collect();
                ChannelComponent {
                    source: *source,
                    present: !signals.is_empty(),
                    sentiment: math::clip(sentiment, -1.0, 1.0),
                    confidence: math::mean(&confidences),
                    priority: self.priority(*source),
                    weight: 0.0,
                    signal_count: signals.len(),
                    volume: channel_volume(signals),
                }
            })
            .collect();
        normalize_weights(&mut components);

        let base_score = math::finite_or(components.iter().map(|c| c.contribution()).sum(), 0.0);

        let news_component = component(&components, SignalSource::News);
        let options_component = component(&components, SignalSource::Options);
        let narrative = news_component.filter(|c| c.present).map(|c| c.sentiment);
        let positioning = options_component.filter(|c| c.present).map(|c| c.sentiment);

        let bars = bundle.price_history.as_deref().unwrap_or(&[]);
        let momentum = self.momentum.analyze(bars, news);
        let divergence = self
            .divergence
            .detect(narrative.unwrap_or(0.0), positioning.unwrap_or(0.0));
        let conviction_volume = channel_volume(news).saturating_add(channel_volume(options));
        let conviction_score = self.conviction.score(narrative, positioning, conviction_volume);
        let fear_greed = self.fear_greed.analyze(news);

        let momentum_boost = momentum.blended * MOMENTUM_BOOST;
        let divergence_penalty = divergence.opportunity_score * DIVERGENCE_PENALTY;
        let final_score = math::clip(
            base_score + momentum_boost - divergence_penalty + fear_greed.adjustment,
            -1.0,
            1.0,
        );
        let (classification, confidence_level) = classify(final_score, conviction_score);

        let smart_money_factor = positioning
            .map(|p| math::clip(p * self.config.institutional_premium, -1.0, 1.0))
            .unwrap_or(0.0);

        let regime = self.regime.detect(options, bundle.options_metrics.as_ref());
        let signal_reliability = match &regime {
            Some(regime) => {
                let iv_excess = (regime.avg_implied_volatility - IV_EXCESS_FLOOR).max(0.0);
                math::clip(
                    1.0 - regime.signal_adjustment - self.config.volatility_penalty * iv_excess,
                    0.0,
                    1.0,
                )
            }
            None => 1.0,
        };

        let catalysts = self.catalysts.detect(news);

        let channel_counts: BTreeMap<SignalSource, usize> = components
            .iter()
            .map(|c| (c.source, c.signal_count))
            .collect();
        let total_signals = bundle.total_signals();

        tracing::debug!(
            "{}: base={:.3} momentum_boost={:.3} divergence_penalty={:.3} fear_greed={:.3}",
            bundle.symbol,
            base_score,
            momentum_boost,
            divergence_penalty,
            fear_greed.adjustment
        );

        let mut report = CompositeReport {
            symbol: bundle.symbol.clone(),
            as_of: bundle.as_of,
            final_score,
            classification,
            confidence_level,
            conviction_score,
            smart_money_factor,
            components,
            divergence,
            regime,
            catalysts,
            advanced_metrics: AdvancedMetrics {
                base_score,
                momentum,
                momentum_boost,
                divergence_penalty,
                fear_greed,
                signal_reliability,
                unparsable_timestamps: decayed_news.unparsable_timestamps,
            },
            alerts: Vec::new(),
            metadata: ReportMetadata {
                channel_counts,
                channels_present,
                total_signals,
                data_depth: DataDepth::from_counts(channels_present, total_signals),
                config: self.config,
            },
        };
        report.alerts = self.alerts.generate(&report);

        tracing::info!(
            "Fused {} channels for {}: score {:.3}, {} ({:?}), {} alerts",
            channels_present,
            report.symbol,
            report.final_score,
            report.classification.to_label(),
            report.confidence_level,
            report.alerts.len()
        );

        FusionOutcome::Report(Box::new(report))
    }
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::new(TickerConfig::default())
    }
}

fn component(components: &[ChannelComponent], source: SignalSource) -> Option<&ChannelComponent> {
    components.iter().find(|c| c.source == source)
}

/// Σ(score·confidence) / Σconfidence, 0 when no confidence.
fn confidence_weighted_mean(signals: &[SentimentSignal]) -> f64 {
    let (weighted, total) = signals.iter().fold((0.0, 0.0), |(w, t), s| {
        let conf = s.bounded_confidence();
        (w + s.bounded_score() * conf, t + conf)
    });
    math::safe_div(weighted, total, 0.0)
}

fn channel_volume(signals: &[SentimentSignal]) -> u64 {
    signals.iter().fold(0u64, |acc, s| acc.saturating_add(s.volume))
}

/// Weight = confidence × priority, normalized to sum to 1. Equal split when
/// every raw weight is zero.
fn normalize_weights(components: &mut [ChannelComponent]) {
    let raw: Vec<f64> = components
        .iter()
        .map(|c| {
            if c.present {
                math::finite_or(c.confidence * c.priority, 0.0).max(0.0)
            } else {
                0.0
            }
        })
        .collect();
    let total: f64 = raw.iter().sum();

    if total > 0.0 {
        for (component, weight) in components.iter_mut().zip(raw) {
            component.weight = weight / total;
        }
    } else {
        let equal = 1.0 / components.len().max(1) as f64;
        for component in components.iter_mut() {
            component.weight = equal;
        }
    }
}
