//! Cross-channel conviction.
//!
//! Conviction is high when narrative and positioning agree in direction and
//! are both strong, and is scaled up slightly by how much volume backs them.

use analysis_core::math;

/// Returned when either channel is missing
pub const NEUTRAL_CONVICTION: f64 = 0.5;
/// Returned (before volume scaling) when the channels disagree in sign
pub const CONFLICT_CONVICTION: f64 = 0.3;

const AGREEMENT_BOOST: f64 = 1.2;
const VOLUME_FLOOR: f64 = 0.7;
const VOLUME_SPAN: f64 = 0.3;
const VOLUME_LOG_SATURATION: f64 = 12.0;

#[derive(Debug, Default)]
pub struct ConvictionScorer;

impl ConvictionScorer {
    pub fn new() -> Self {
        Self
    }

    /// `0.7 + 0.3·min(ln(1 + volume) / 12, 1)`
    pub fn volume_factor(volume: u64) -> f64 {
        let saturation = ((volume as f64).ln_1p() / VOLUME_LOG_SATURATION).min(1.0);
        VOLUME_FLOOR + VOLUME_SPAN * saturation
    }

    pub fn score(&self, narrative: Option<f64>, positioning: Option<f64>, volume: u64) -> f64 {
        let (a, b) = match (narrative, positioning) {
            (Some(a), Some(b)) => (math::finite_or(a, 0.0), math::finite_or(b, 0.0)),
            _ => return NEUTRAL_CONVICTION,
        };

        // Zero counts as agreeing with either side.
        let agree = a * b >= 0.0;
        let raw = if agree {
            (a.abs() + b.abs()) / 2.0 * AGREEMENT_BOOST
        } else {
            CONFLICT_CONVICTION
        };

        math::clip(raw * Self::volume_factor(volume), 0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_channel_is_neutral() {
        let scorer = ConvictionScorer::new();
        assert_eq!(scorer.score(None, Some(0.8), 1_000_000), 0.5);
        assert_eq!(scorer.score(Some(0.8), None, 0), 0.5);
        assert_eq!(scorer.score(None, None, 0), 0.5);
    }

    #[test]
    fn test_agreement() {
        let scorer = ConvictionScorer::new();
        // (0.6 + 0.4)/2 × 1.2 = 0.6, volume 0 -> factor 0.7
        assert!((scorer.score(Some(0.6), Some(0.4), 0) - 0.42).abs() < 1e-12);
        assert!((scorer.score(Some(-0.6), Some(-0.4), 0) - 0.42).abs() < 1e-12);
    }

    #[test]
    fn test_disagreement_is_fixed() {
        let scorer = ConvictionScorer::new();
        assert!((scorer.score(Some(0.9), Some(-0.9), 0) - 0.3 * 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_volume_factor_saturates() {
        assert_eq!(ConvictionScorer::volume_factor(0), 0.7);
        assert!((ConvictionScorer::volume_factor(u64::MAX) - 1.0).abs() < 1e-12);
        assert!(ConvictionScorer::volume_factor(1_000) < ConvictionScorer::volume_factor(10_000));
    }

    #[test]
    fn test_result_is_clipped() {
        let scorer = ConvictionScorer::new();
        assert_eq!(scorer.score(Some(1.0), Some(1.0), u64::MAX), 1.0);
    }
}
