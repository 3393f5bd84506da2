//! Temporal Decay Weighting
//!
//! Ages news-channel signals with an exponential half-life so that recent
//! coverage dominates the channel sentiment.

use analysis_core::{math, SentimentSignal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weight given to a signal whose timestamp cannot be parsed. Bounds the
/// record's influence without dropping it.
pub const UNPARSABLE_TIMESTAMP_WEIGHT: f64 = 0.1;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Decay-weighted view of one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayedChannel {
    /// Σ(score·confidence·weight) / n
    pub weighted_sentiment: f64,
    /// Per-signal weights in input order
    pub weights: Vec<f64>,
    /// Count of signals that fell back to the fixed low weight
    pub unparsable_timestamps: usize,
}

pub struct TemporalDecayWeighter {
    half_life_days: f64,
}

impl TemporalDecayWeighter {
    pub fn new(half_life_days: f64) -> Self {
        let half_life_days = if half_life_days.is_finite() && half_life_days > 0.0 {
            half_life_days
        } else {
            analysis_core::DECAY_HALF_LIFE_DAYS.default
        };
        Self { half_life_days }
    }

    pub fn half_life_days(&self) -> f64 {
        self.half_life_days
    }

    /// `0.5^(age_days / half_life)`; future timestamps count as age 0.
    pub fn weight_for_age(&self, age_days: f64) -> f64 {
        let age = math::finite_or(age_days, 0.0).max(0.0);
        0.5_f64.powf(age / self.half_life_days)
    }

    pub fn weight(&self, signal: &SentimentSignal, as_of: DateTime<Utc>) -> f64 {
        match signal.parsed_timestamp() {
            Some(ts) => {
                let age_days = (as_of - ts).num_seconds() as f64 / SECONDS_PER_DAY;
                self.weight_for_age(age_days)
            }
            None => UNPARSABLE_TIMESTAMP_WEIGHT,
        }
    }

    pub fn weigh(&self, signals: &[SentimentSignal], as_of: DateTime<Utc>) -> DecayedChannel {
        if signals.is_empty() {
            return DecayedChannel {
                weighted_sentiment: 0.0,
                weights: Vec::new(),
                unparsable_timestamps: 0,
            };
        }

        let weights: Vec<f64> = signals.iter().map(|s| self.weight(s, as_of)).collect();
        let unparsable_timestamps = signals
            .iter()
            .filter(|s| s.parsed_timestamp().is_none())
            .count();

        let total: f64 = signals
            .iter()
            .zip(&weights)
            .map(|(s, w)| s.bounded_score() * s.bounded_confidence() * w)
            .sum();

        if unparsable_timestamps > 0 {
            tracing::debug!(
                "{} of {} signals had unparsable timestamps; using fallback weight {}",
                unparsable_timestamps,
                signals.len(),
                UNPARSABLE_TIMESTAMP_WEIGHT
            );
        }

        DecayedChannel {
            weighted_sentiment: math::safe_div(total, signals.len() as f64, 0.0),
            weights,
            unparsable_timestamps,
        }
    }
}

impl Default for TemporalDecayWeighter {
    fn default() -> Self {
        Self::new(analysis_core::DECAY_HALF_LIFE_DAYS.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::SignalSource;
    use chrono::{Duration, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn news_at(ts: DateTime<Utc>, score: f64, confidence: f64) -> SentimentSignal {
        SentimentSignal::new(ts.to_rfc3339(), SignalSource::News, score, confidence, 1)
    }

    #[test]
    fn test_weight_at_zero_and_half_life() {
        let weighter = TemporalDecayWeighter::new(3.0);
        assert_eq!(weighter.weight_for_age(0.0), 1.0);
        assert_eq!(weighter.weight_for_age(3.0), 0.5);
        assert_eq!(weighter.weight_for_age(6.0), 0.25);
    }

    #[test]
    fn test_weight_is_monotonically_non_increasing() {
        let weighter = TemporalDecayWeighter::new(2.5);
        let mut previous = f64::INFINITY;
        for step in 0..200 {
            let w = weighter.weight_for_age(step as f64 * 0.25);
            assert!(w <= previous);
            previous = w;
        }
    }

    #[test]
    fn test_future_timestamps_weigh_as_fresh() {
        let weighter = TemporalDecayWeighter::new(3.0);
        let signal = news_at(as_of() + Duration::days(2), 0.5, 1.0);
        assert_eq!(weighter.weight(&signal, as_of()), 1.0);
    }

    #[test]
    fn test_unparsable_timestamp_keeps_signal_with_fallback_weight() {
        let weighter = TemporalDecayWeighter::new(3.0);
        let signals = vec![
            SentimentSignal::new("not-a-date", SignalSource::News, 1.0, 1.0, 1),
            news_at(as_of(), 0.5, 1.0),
        ];
        let decayed = weighter.weigh(&signals, as_of());

        assert_eq!(decayed.weights, vec![UNPARSABLE_TIMESTAMP_WEIGHT, 1.0]);
        assert_eq!(decayed.unparsable_timestamps, 1);
        // (1.0·1.0·0.1 + 0.5·1.0·1.0) / 2
        assert!((decayed.weighted_sentiment - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_sentiment_divides_by_count() {
        let weighter = TemporalDecayWeighter::new(3.0);
        let signals = vec![
            news_at(as_of(), 0.8, 0.5),
            news_at(as_of() - Duration::days(3), -0.4, 1.0),
        ];
        let decayed = weighter.weigh(&signals, as_of());
        // (0.8·0.5·1.0 + -0.4·1.0·0.5) / 2 = 0.1
        assert!((decayed.weighted_sentiment - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_empty_channel_is_zero() {
        let decayed = TemporalDecayWeighter::default().weigh(&[], as_of());
        assert_eq!(decayed.weighted_sentiment, 0.0);
        assert!(decayed.weights.is_empty());
    }

    #[test]
    fn test_invalid_half_life_uses_default() {
        assert_eq!(TemporalDecayWeighter::new(0.0).half_life_days(), 3.0);
        assert_eq!(TemporalDecayWeighter::new(f64::NAN).half_life_days(), 3.0);
    }
}
