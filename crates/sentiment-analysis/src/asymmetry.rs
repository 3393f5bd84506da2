//! Fear/greed asymmetry.
//!
//! Markets react harder to bad news than to good news. When the negative side
//! of the news flow is clearly heavier than the positive side the composite is
//! nudged down, and nudged up by a smaller amount in the reverse case.

use analysis_core::{math, SentimentSignal};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DOMINANCE_RATIO: f64 = 1.3;
// Empirically tuned; candidates for recalibration.
pub const FEAR_ADJUSTMENT: f64 = -0.15;
pub const GREED_ADJUSTMENT: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentBias {
    FearDominant,
    GreedDominant,
    Balanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FearGreedAnalysis {
    pub adjustment: f64,
    pub bias: SentimentBias,
    pub positive_mean: f64,
    pub negative_mean: f64,
}

pub struct FearGreedAdjuster {
    ratio: f64,
}

impl FearGreedAdjuster {
    pub fn new(ratio: f64) -> Self {
        let ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            DEFAULT_DOMINANCE_RATIO
        };
        Self { ratio }
    }

    pub fn analyze(&self, news: &[SentimentSignal]) -> FearGreedAnalysis {
        let positive: Vec<f64> = news
            .iter()
            .map(|s| s.bounded_score())
            .filter(|s| *s > 0.0)
            .collect();
        let negative: Vec<f64> = news
            .iter()
            .map(|s| s.bounded_score())
            .filter(|s| *s < 0.0)
            .map(f64::abs)
            .collect();

        let positive_mean = math::mean(&positive);
        let negative_mean = math::mean(&negative);

        let (adjustment, bias) = if positive.is_empty() || negative.is_empty() {
            (0.0, SentimentBias::Balanced)
        } else if negative_mean > positive_mean * self.ratio {
            (FEAR_ADJUSTMENT, SentimentBias::FearDominant)
        } else if positive_mean > negative_mean * self.ratio {
            (GREED_ADJUSTMENT, SentimentBias::GreedDominant)
        } else {
            (0.0, SentimentBias::Balanced)
        };

        FearGreedAnalysis {
            adjustment,
            bias,
            positive_mean,
            negative_mean,
        }
    }
}

impl Default for FearGreedAdjuster {
    fn default() -> Self {
        Self::new(DEFAULT_DOMINANCE_RATIO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::SignalSource;

    fn news(scores: &[f64]) -> Vec<SentimentSignal> {
        scores
            .iter()
            .map(|&s| SentimentSignal::new("2024-01-01", SignalSource::News, s, 1.0, 1))
            .collect()
    }

    #[test]
    fn test_fear_dominant() {
        let result = FearGreedAdjuster::default().analyze(&news(&[0.2, 0.2, -0.6]));
        assert_eq!(result.adjustment, FEAR_ADJUSTMENT);
        assert_eq!(result.bias, SentimentBias::FearDominant);
    }

    #[test]
    fn test_greed_dominant_is_smaller() {
        let result = FearGreedAdjuster::default().analyze(&news(&[0.8, -0.2]));
        assert_eq!(result.adjustment, GREED_ADJUSTMENT);
        assert!(result.adjustment.abs() < FEAR_ADJUSTMENT.abs());
    }

    #[test]
    fn test_within_ratio_is_balanced() {
        let result = FearGreedAdjuster::default().analyze(&news(&[0.5, -0.6]));
        assert_eq!(result.adjustment, 0.0);
        assert_eq!(result.bias, SentimentBias::Balanced);
    }

    #[test]
    fn test_one_sided_flow_is_zero() {
        assert_eq!(FearGreedAdjuster::default().analyze(&news(&[-0.9, -0.8])).adjustment, 0.0);
        assert_eq!(FearGreedAdjuster::default().analyze(&news(&[0.9, 0.0])).adjustment, 0.0);
        assert_eq!(FearGreedAdjuster::default().analyze(&[]).adjustment, 0.0);
    }
}
