use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::math;

/// Independent channel a sentiment observation comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSource {
    News,
    Options,
    Analyst,
    Financial,
}

impl SignalSource {
    /// Fixed channel order used for weights, breakdowns and counts.
    pub const ALL: [SignalSource; 4] = [
        SignalSource::News,
        SignalSource::Options,
        SignalSource::Analyst,
        SignalSource::Financial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalSource::News => "news",
            SignalSource::Options => "options",
            SignalSource::Analyst => "analyst",
            SignalSource::Financial => "financial",
        }
    }
}

/// News article details attached to a news-channel signal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Positioning data attached to an options-channel signal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionsMeta {
    #[serde(default)]
    pub put_call_ratio: Option<f64>,
    #[serde(default)]
    pub implied_volatility: Option<f64>,
    #[serde(default)]
    pub open_interest: Option<u64>,
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalystMeta {
    #[serde(default)]
    pub firm: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub price_target: Option<f64>,
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialMeta {
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Source-specific payload. Generic scoring code never looks inside it; only the
/// catalyst detector (news titles) and the regime detector (options IV and
/// put/call ratio) read their own variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SignalMetadata {
    News(NewsMeta),
    Options(OptionsMeta),
    Analyst(AnalystMeta),
    Financial(FinancialMeta),
    #[default]
    None,
}

impl SignalMetadata {
    pub fn as_news(&self) -> Option<&NewsMeta> {
        match self {
            SignalMetadata::News(meta) => Some(meta),
            _ => None,
        }
    }

    pub fn as_options(&self) -> Option<&OptionsMeta> {
        match self {
            SignalMetadata::Options(meta) => Some(meta),
            _ => None,
        }
    }
}

/// One observation from one channel. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSignal {
    /// Raw timestamp as supplied by the loader; may be malformed.
    pub timestamp: String,
    pub source: SignalSource,
    /// -1.0 to 1.0
    pub score: f64,
    /// 0.0 to 1.0
    pub confidence: f64,
    /// Article count or contract count
    pub volume: u64,
    #[serde(default)]
    pub metadata: SignalMetadata,
}

impl SentimentSignal {
    pub fn new(
        timestamp: impl Into<String>,
        source: SignalSource,
        score: f64,
        confidence: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            source,
            score: math::clip(math::finite_or(score, 0.0), -1.0, 1.0),
            confidence: math::clip(math::finite_or(confidence, 0.0), 0.0, 1.0),
            volume,
            metadata: SignalMetadata::None,
        }
    }

    pub fn with_metadata(mut self, metadata: SignalMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Score guarded to [-1, 1]; non-finite values read as 0.
    pub fn bounded_score(&self) -> f64 {
        math::clip(math::finite_or(self.score, 0.0), -1.0, 1.0)
    }

    /// Confidence guarded to [0, 1]; non-finite values read as 0.
    pub fn bounded_confidence(&self) -> f64 {
        math::clip(math::finite_or(self.confidence, 0.0), 0.0, 1.0)
    }

    /// Parse the raw timestamp. Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and
    /// `YYYY-MM-DD` (both read as UTC).
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Aggregate options metrics for an instrument at the current time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionsMetrics {
    pub avg_implied_volatility: Option<f64>,
    pub put_call_ratio: Option<f64>,
    #[serde(default)]
    pub put_call_oi_ratio: Option<f64>,
}

/// OHLCV bar data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub vwap: Option<f64>,
}

/// Everything one fusion run consumes. `None` and an empty vector both mean the
/// channel is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalBundle {
    pub symbol: String,
    /// Reference instant for signal ages.
    pub as_of: DateTime<Utc>,
    pub news: Option<Vec<SentimentSignal>>,
    pub options: Option<Vec<SentimentSignal>>,
    pub analyst: Option<Vec<SentimentSignal>>,
    pub financial: Option<Vec<SentimentSignal>>,
    pub options_metrics: Option<OptionsMetrics>,
    pub price_history: Option<Vec<Bar>>,
}

impl SignalBundle {
    pub fn new(symbol: impl Into<String>, as_of: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            as_of,
            news: None,
            options: None,
            analyst: None,
            financial: None,
            options_metrics: None,
            price_history: None,
        }
    }

    pub fn with_channel(mut self, source: SignalSource, signals: Vec<SentimentSignal>) -> Self {
        *self.channel_slot(source) = Some(signals);
        self
    }

    pub fn with_options_metrics(mut self, metrics: OptionsMetrics) -> Self {
        self.options_metrics = Some(metrics);
        self
    }

    pub fn with_price_history(mut self, bars: Vec<Bar>) -> Self {
        self.price_history = Some(bars);
        self
    }

    fn channel_slot(&mut self, source: SignalSource) -> &mut Option<Vec<SentimentSignal>> {
        match source {
            SignalSource::News => &mut self.news,
            SignalSource::Options => &mut self.options,
            SignalSource::Analyst => &mut self.analyst,
            SignalSource::Financial => &mut self.financial,
        }
    }

    /// Signals of a channel, or `None` when the channel is missing or empty.
    pub fn channel(&self, source: SignalSource) -> Option<&[SentimentSignal]> {
        let signals = match source {
            SignalSource::News => self.news.as_deref(),
            SignalSource::Options => self.options.as_deref(),
            SignalSource::Analyst => self.analyst.as_deref(),
            SignalSource::Financial => self.financial.as_deref(),
        };
        signals.filter(|s| !s.is_empty())
    }

    pub fn channels_present(&self) -> usize {
        SignalSource::ALL
            .iter()
            .filter(|source| self.channel(**source).is_some())
            .count()
    }

    pub fn total_signals(&self) -> usize {
        SignalSource::ALL
            .iter()
            .filter_map(|source| self.channel(*source))
            .map(|signals| signals.len())
            .sum()
    }
}
