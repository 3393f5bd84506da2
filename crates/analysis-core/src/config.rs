//! Per-instrument tunables.
//!
//! A `TickerConfig` is resolved once per engine construction, either from the
//! static defaults or from a `ConfigAdvisor` candidate, and never changes during
//! a run. Out-of-range values are clipped, never rejected.

use serde::{Deserialize, Serialize};

use crate::math;

/// Valid range and default for one tunable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamBounds {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl ParamBounds {
    const fn new(min: f64, max: f64, default: f64) -> Self {
        Self { min, max, default }
    }

    /// Clamp into range; non-finite input takes the default.
    pub fn apply(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }
}

pub const DECAY_HALF_LIFE_DAYS: ParamBounds = ParamBounds::new(0.5, 30.0, 3.0);
pub const MOMENTUM_WINDOW_DAYS: ParamBounds = ParamBounds::new(3.0, 60.0, 10.0);
pub const VOLATILITY_PENALTY: ParamBounds = ParamBounds::new(0.0, 1.0, 0.2);
pub const DIVERGENCE_THRESHOLD: ParamBounds = ParamBounds::new(0.05, 1.0, 0.3);
pub const INSTITUTIONAL_PREMIUM: ParamBounds = ParamBounds::new(1.0, 2.0, 1.2);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickerConfig {
    /// Days after which a news signal's weight halves
    pub decay_half_life_days: f64,
    /// Look-back for price, velocity and volume momentum
    pub momentum_window_days: u32,
    /// Scales implied-volatility excess subtracted from signal reliability
    pub volatility_penalty: f64,
    /// Minimum |narrative - positioning| gap counted as divergence
    pub divergence_threshold: f64,
    /// Extra priority given to the options (institutional) channel
    pub institutional_premium: f64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            decay_half_life_days: DECAY_HALF_LIFE_DAYS.default,
            momentum_window_days: MOMENTUM_WINDOW_DAYS.default as u32,
            volatility_penalty: VOLATILITY_PENALTY.default,
            divergence_threshold: DIVERGENCE_THRESHOLD.default,
            institutional_premium: INSTITUTIONAL_PREMIUM.default,
        }
    }
}

impl TickerConfig {
    /// Copy with every field clamped into its documented range.
    pub fn clipped(&self) -> Self {
        Self {
            decay_half_life_days: DECAY_HALF_LIFE_DAYS.apply(self.decay_half_life_days),
            momentum_window_days: MOMENTUM_WINDOW_DAYS.apply(self.momentum_window_days as f64) as u32,
            volatility_penalty: VOLATILITY_PENALTY.apply(self.volatility_penalty),
            divergence_threshold: DIVERGENCE_THRESHOLD.apply(self.divergence_threshold),
            institutional_premium: INSTITUTIONAL_PREMIUM.apply(self.institutional_premium),
        }
    }

    pub fn is_within_bounds(&self) -> bool {
        self == &self.clipped()
    }
}

/// Partial config as suggested by an advisor. Missing fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateConfig {
    #[serde(default)]
    pub decay_half_life_days: Option<f64>,
    #[serde(default)]
    pub momentum_window_days: Option<f64>,
    #[serde(default)]
    pub volatility_penalty: Option<f64>,
    #[serde(default)]
    pub divergence_threshold: Option<f64>,
    #[serde(default)]
    pub institutional_premium: Option<f64>,
}

impl CandidateConfig {
    /// Validate into a frozen config: clip present values, default the rest.
    pub fn resolve(&self) -> TickerConfig {
        let pick = |value: Option<f64>, bounds: &ParamBounds| {
            value.map(|v| bounds.apply(v)).unwrap_or(bounds.default)
        };
        let window = pick(self.momentum_window_days, &MOMENTUM_WINDOW_DAYS);

        TickerConfig {
            decay_half_life_days: pick(self.decay_half_life_days, &DECAY_HALF_LIFE_DAYS),
            momentum_window_days: math::finite_or(window.round(), MOMENTUM_WINDOW_DAYS.default) as u32,
            volatility_penalty: pick(self.volatility_penalty, &VOLATILITY_PENALTY),
            divergence_threshold: pick(self.divergence_threshold, &DIVERGENCE_THRESHOLD),
            institutional_premium: pick(self.institutional_premium, &INSTITUTIONAL_PREMIUM),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_within_bounds() {
        assert!(TickerConfig::default().is_within_bounds());
    }

    #[test]
    fn test_out_of_range_values_are_clipped() {
        let config = TickerConfig {
            decay_half_life_days: 0.0,
            momentum_window_days: 500,
            volatility_penalty: -1.0,
            divergence_threshold: f64::NAN,
            institutional_premium: 9.0,
        }
        .clipped();

        assert_eq!(config.decay_half_life_days, 0.5);
        assert_eq!(config.momentum_window_days, 60);
        assert_eq!(config.volatility_penalty, 0.0);
        assert_eq!(config.divergence_threshold, 0.3);
        assert_eq!(config.institutional_premium, 2.0);
    }

    #[test]
    fn test_candidate_fills_missing_fields() {
        let candidate = CandidateConfig {
            decay_half_life_days: Some(5.0),
            momentum_window_days: Some(2.0),
            ..Default::default()
        };
        let config = candidate.resolve();

        assert_eq!(config.decay_half_life_days, 5.0);
        assert_eq!(config.momentum_window_days, 3);
        assert_eq!(config.divergence_threshold, 0.3);
        assert_eq!(config.institutional_premium, 1.2);
    }
}
