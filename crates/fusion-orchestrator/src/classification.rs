//! Classification bands for the composite score.
//!
//! Bands are evaluated in table order and the first match wins. All
//! comparisons are strict.

use crate::report::{Classification, ConfidenceLevel};

/// Conviction below which a HOLD is reported with LOW confidence
pub const LOW_CONVICTION: f64 = 0.3;

pub struct ClassificationBand {
    pub classification: Classification,
    pub confidence: ConfidenceLevel,
    pub matches: fn(f64, f64) -> bool,
}

pub const CLASSIFICATION_BANDS: [ClassificationBand; 4] = [
    ClassificationBand {
        classification: Classification::StrongBuy,
        confidence: ConfidenceLevel::High,
        matches: |score, conviction| score > 0.5 && conviction > 0.7,
    },
    ClassificationBand {
        classification: Classification::Buy,
        confidence: ConfidenceLevel::Medium,
        matches: |score, conviction| score > 0.2 && conviction > 0.5,
    },
    ClassificationBand {
        classification: Classification::StrongSell,
        confidence: ConfidenceLevel::High,
        matches: |score, conviction| score < -0.5 && conviction > 0.7,
    },
    ClassificationBand {
        classification: Classification::Sell,
        confidence: ConfidenceLevel::Medium,
        matches: |score, conviction| score < -0.2 && conviction > 0.5,
    },
];

pub fn classify(final_score: f64, conviction: f64) -> (Classification, ConfidenceLevel) {
    CLASSIFICATION_BANDS
        .iter()
        .find(|band| (band.matches)(final_score, conviction))
        .map(|band| (band.classification, band.confidence))
        .unwrap_or_else(|| {
            let confidence = if conviction < LOW_CONVICTION {
                ConfidenceLevel::Low
            } else {
                ConfidenceLevel::Medium
            };
            (Classification::Hold, confidence)
        })
}
