use analysis_core::{SignalSource, TickerConfig};
use catalyst_detector::CatalystReport;
use chrono::{DateTime, Utc};
use market_regime_detector::RegimeAnalysis;
use sentiment_analysis::{DivergenceAnalysis, FearGreedAnalysis, MomentumAnalysis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::alerts::Alert;

/// Directional call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Classification {
    /// Human-readable label for the signal
    pub fn to_label(&self) -> &'static str {
        match self {
            Classification::StrongBuy => "Strong Buy",
            Classification::Buy => "Buy",
            Classification::Hold => "Hold",
            Classification::Sell => "Sell",
            Classification::StrongSell => "Strong Sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// How much data stood behind the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataDepth {
    /// Fewer than 2 channels or fewer than 5 signals
    Sparse,
    Adequate,
    Deep,
}

impl DataDepth {
    pub fn from_counts(channels_present: usize, total_signals: usize) -> Self {
        if channels_present < 2 || total_signals < 5 {
            DataDepth::Sparse
        } else if total_signals < 20 {
            DataDepth::Adequate
        } else {
            DataDepth::Deep
        }
    }
}

/// Per-channel contribution to the base score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelComponent {
    pub source: SignalSource,
    pub present: bool,
    pub sentiment: f64,
    pub confidence: f64,
    /// Fixed channel-priority coefficient (options includes the institutional premium)
    pub priority: f64,
    /// Normalized weight; all four sum to 1
    pub weight: f64,
    pub signal_count: usize,
    pub volume: u64,
}

impl ChannelComponent {
    pub fn contribution(&self) -> f64 {
        self.sentiment * self.weight
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedMetrics {
    /// Σ(channel sentiment × weight) before adjustments
    pub base_score: f64,
    pub momentum: MomentumAnalysis,
    /// momentum × 0.15
    pub momentum_boost: f64,
    /// divergence opportunity × 0.1
    pub divergence_penalty: f64,
    pub fear_greed: FearGreedAnalysis,
    /// 1 − regime adjustment − volatility penalty × IV excess, in [0, 1]
    pub signal_reliability: f64,
    pub unparsable_timestamps: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub channel_counts: BTreeMap<SignalSource, usize>,
    pub channels_present: usize,
    pub total_signals: usize,
    pub data_depth: DataDepth,
    pub config: TickerConfig,
}

/// The single output of a fusion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeReport {
    pub symbol: String,
    pub as_of: DateTime<Utc>,
    /// Composite score in [-1, 1]
    pub final_score: f64,
    pub classification: Classification,
    pub confidence_level: ConfidenceLevel,
    /// Cross-channel agreement in [0, 1]
    pub conviction_score: f64,
    pub smart_money_factor: f64,
    pub components: Vec<ChannelComponent>,
    pub divergence: DivergenceAnalysis,
    pub regime: Option<RegimeAnalysis>,
    pub catalysts: CatalystReport,
    pub advanced_metrics: AdvancedMetrics,
    pub alerts: Vec<Alert>,
    pub metadata: ReportMetadata,
}

impl CompositeReport {
    pub fn component(&self, source: SignalSource) -> Option<&ChannelComponent> {
        self.components.iter().find(|c| c.source == source)
    }
}

/// Returned instead of a report when no channel produced any signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoDataReport {
    pub symbol: String,
    pub as_of: DateTime<Utc>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FusionOutcome {
    Report(Box<CompositeReport>),
    NoData(NoDataReport),
}

impl FusionOutcome {
    pub fn symbol(&self) -> &str {
        match self {
            FusionOutcome::Report(report) => &report.symbol,
            FusionOutcome::NoData(no_data) => &no_data.symbol,
        }
    }

    pub fn report(&self) -> Option<&CompositeReport> {
        match self {
            FusionOutcome::Report(report) => Some(report),
            FusionOutcome::NoData(_) => None,
        }
    }

    pub fn into_report(self) -> Option<CompositeReport> {
        match self {
            FusionOutcome::Report(report) => Some(*report),
            FusionOutcome::NoData(_) => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, FusionOutcome::NoData(_))
    }
}
