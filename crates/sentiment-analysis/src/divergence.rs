//! Narrative vs positioning divergence.
//!
//! Compares the news (narrative) channel with the options (positioning)
//! channel. Rows of `DIVERGENCE_RULES` are tried in order; the first match wins.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DivergenceType {
    Aligned,
    /// Upbeat narrative, bearish positioning
    BearishDivergence,
    /// Gloomy narrative, bullish positioning
    BullishDivergence,
    WeakDivergence,
}

impl DivergenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DivergenceType::Aligned => "ALIGNED",
            DivergenceType::BearishDivergence => "BEARISH_DIVERGENCE",
            DivergenceType::BullishDivergence => "BULLISH_DIVERGENCE",
            DivergenceType::WeakDivergence => "WEAK_DIVERGENCE",
        }
    }
}

/// One row of the ordered divergence table
pub struct DivergenceRule {
    pub kind: DivergenceType,
    /// Opportunity = |a − b| × multiplier
    pub multiplier: f64,
    pub matches: fn(narrative: f64, positioning: f64, gap: f64, threshold: f64) -> bool,
    pub template: &'static str,
}

fn within_threshold(_a: f64, _b: f64, gap: f64, threshold: f64) -> bool {
    gap < threshold
}

fn narrative_up_positioning_down(a: f64, b: f64, _gap: f64, _threshold: f64) -> bool {
    a > 0.0 && b < 0.0
}

fn narrative_down_positioning_up(a: f64, b: f64, _gap: f64, _threshold: f64) -> bool {
    a < 0.0 && b > 0.0
}

fn any(_a: f64, _b: f64, _gap: f64, _threshold: f64) -> bool {
    true
}

// The 1.2 / 0.8 asymmetry is empirically tuned: positioning that contradicts a
// bad narrative is treated as the stronger tell. Candidate for recalibration.
pub const DIVERGENCE_RULES: [DivergenceRule; 4] = [
    DivergenceRule {
        kind: DivergenceType::Aligned,
        multiplier: 0.0,
        matches: within_threshold,
        template: "News and options positioning agree",
    },
    DivergenceRule {
        kind: DivergenceType::BearishDivergence,
        multiplier: 0.8,
        matches: narrative_up_positioning_down,
        template: "Positive news but bearish options positioning: smart money may be hedging",
    },
    DivergenceRule {
        kind: DivergenceType::BullishDivergence,
        multiplier: 1.2,
        matches: narrative_down_positioning_up,
        template: "Negative news but bullish options positioning: smart money may be accumulating",
    },
    DivergenceRule {
        kind: DivergenceType::WeakDivergence,
        multiplier: 0.3,
        matches: any,
        template: "News and options differ in strength but not in direction",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivergenceAnalysis {
    pub divergence_type: DivergenceType,
    pub narrative_sentiment: f64,
    pub positioning_sentiment: f64,
    /// |narrative − positioning|
    pub magnitude: f64,
    pub opportunity_score: f64,
    pub message: String,
}

pub struct DivergenceDetector {
    threshold: f64,
}

impl DivergenceDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn detect(&self, narrative: f64, positioning: f64) -> DivergenceAnalysis {
        let gap = (narrative - positioning).abs();
        let rule = DIVERGENCE_RULES
            .iter()
            .find(|rule| (rule.matches)(narrative, positioning, gap, self.threshold))
            .unwrap_or(&DIVERGENCE_RULES[DIVERGENCE_RULES.len() - 1]);

        let message = match rule.kind {
            DivergenceType::Aligned => format!("{} (gap {:.2})", rule.template, gap),
            _ => format!("{} (magnitude {:.2})", rule.template, gap),
        };

        DivergenceAnalysis {
            divergence_type: rule.kind,
            narrative_sentiment: narrative,
            positioning_sentiment: positioning,
            magnitude: gap,
            opportunity_score: gap * rule.multiplier,
            message,
        }
    }
}

impl Default for DivergenceDetector {
    fn default() -> Self {
        Self::new(analysis_core::DIVERGENCE_THRESHOLD.default)
    }
}
