use analysis_core::{math, OptionsMetrics, SentimentSignal};
use serde::{Deserialize, Serialize};

/// Put/call ratio above which positioning counts as defensive
pub const ELEVATED_PUT_CALL_RATIO: f64 = 1.0;
/// Splits the moderate band into rising and falling halves
pub const MODERATE_MID_BAND: f64 = 0.35;
/// High-volatility implication when no put/call ratio is available
pub const UNKNOWN_POSITIONING_IMPLICATION: &str =
    "Elevated volatility; put/call positioning unavailable, direction of the excess unknown";

/// Volatility regime classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolatilityRegime {
    /// Implied volatility above 0.5
    HighVolatility,
    /// Implied volatility below 0.2
    LowVolatility,
    /// Implied volatility in [0.3, 0.4]
    NormalVolatility,
    /// Everything between the other bands
    ModerateVolatility,
}

impl VolatilityRegime {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            VolatilityRegime::HighVolatility => "High Volatility",
            VolatilityRegime::LowVolatility => "Low Volatility",
            VolatilityRegime::NormalVolatility => "Normal Volatility",
            VolatilityRegime::ModerateVolatility => "Moderate Volatility",
        }
    }

    pub fn is_extreme(&self) -> bool {
        matches!(self, VolatilityRegime::HighVolatility | VolatilityRegime::LowVolatility)
    }
}

/// Sub-state within a regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegimeState {
    Panic,
    Euphoria,
    Complacent,
    Healthy,
    Rising,
    Falling,
}

/// Fixed guidance attached to each sub-state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateProfile {
    pub state: RegimeState,
    pub implication: &'static str,
    pub recommendation: &'static str,
    /// Subtracted from signal reliability downstream
    pub signal_adjustment: f64,
}

pub const STATE_PROFILES: [StateProfile; 6] = [
    StateProfile {
        state: RegimeState::Panic,
        implication: "Elevated volatility with heavy put buying: fear is driving prices",
        recommendation: "Reduce position sizes and wait for volatility to subside before acting on sentiment",
        signal_adjustment: 0.30,
    },
    StateProfile {
        state: RegimeState::Euphoria,
        implication: "Elevated volatility with call-heavy positioning: speculative excess",
        recommendation: "Take partial profits and tighten stops; sentiment readings are less reliable",
        signal_adjustment: 0.20,
    },
    StateProfile {
        state: RegimeState::Complacent,
        implication: "Unusually quiet options market: little hedging in place",
        recommendation: "Cheap protection is available; watch for a volatility expansion",
        signal_adjustment: 0.10,
    },
    StateProfile {
        state: RegimeState::Healthy,
        implication: "Volatility within its normal range",
        recommendation: "Sentiment signals can be used at full weight",
        signal_adjustment: 0.0,
    },
    StateProfile {
        state: RegimeState::Rising,
        implication: "Volatility above normal and drifting higher",
        recommendation: "Scale into positions gradually and monitor for a regime shift",
        signal_adjustment: 0.10,
    },
    StateProfile {
        state: RegimeState::Falling,
        implication: "Volatility below normal and settling",
        recommendation: "Conditions are calming; sentiment signals are gaining reliability",
        signal_adjustment: 0.05,
    },
];

impl RegimeState {
    pub fn profile(&self) -> &'static StateProfile {
        STATE_PROFILES
            .iter()
            .find(|p| p.state == *self)
            .unwrap_or(&STATE_PROFILES[3])
    }
}

/// One row of the ordered band table
pub struct RegimeBand {
    pub regime: VolatilityRegime,
    pub matches: fn(iv: f64) -> bool,
    /// `put_call` is `None` when no ratio is available
    pub sub_state: fn(iv: f64, put_call: Option<f64>) -> RegimeState,
}

fn above_high(iv: f64) -> bool {
    iv > 0.5
}

fn below_low(iv: f64) -> bool {
    iv < 0.2
}

fn in_normal(iv: f64) -> bool {
    (0.3..=0.4).contains(&iv)
}

fn any(_iv: f64) -> bool {
    true
}

fn high_state(_iv: f64, put_call: Option<f64>) -> RegimeState {
    match put_call {
        Some(r) if r > ELEVATED_PUT_CALL_RATIO => RegimeState::Panic,
        _ => RegimeState::Euphoria,
    }
}

fn low_state(_iv: f64, _put_call: Option<f64>) -> RegimeState {
    RegimeState::Complacent
}

fn normal_state(_iv: f64, _put_call: Option<f64>) -> RegimeState {
    RegimeState::Healthy
}

fn moderate_state(iv: f64, _put_call: Option<f64>) -> RegimeState {
    if iv > MODERATE_MID_BAND {
        RegimeState::Rising
    } else {
        RegimeState::Falling
    }
}

/// Tried in order, first match wins. Comparisons are strict at 0.5 and 0.2 and
/// inclusive on the normal band.
pub const REGIME_BANDS: [RegimeBand; 4] = [
    RegimeBand {
        regime: VolatilityRegime::HighVolatility,
        matches: above_high,
        sub_state: high_state,
    },
    RegimeBand {
        regime: VolatilityRegime::LowVolatility,
        matches: below_low,
        sub_state: low_state,
    },
    RegimeBand {
        regime: VolatilityRegime::NormalVolatility,
        matches: in_normal,
        sub_state: normal_state,
    },
    RegimeBand {
        regime: VolatilityRegime::ModerateVolatility,
        matches: any,
        sub_state: moderate_state,
    },
];

/// Regime detection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeAnalysis {
    pub regime: VolatilityRegime,
    pub state: RegimeState,
    /// Averaged implied volatility the band was chosen on
    pub avg_implied_volatility: f64,
    /// `None` when neither the options signals nor the metrics carried one
    pub put_call_ratio: Option<f64>,
    pub implication: String,
    pub recommendation: String,
    pub signal_adjustment: f64,
    pub reasoning: String,
}

/// Options-driven volatility regime detector
#[derive(Debug, Default)]
pub struct MarketRegimeDetector;

impl MarketRegimeDetector {
    pub fn new() -> Self {
        Self
    }

    /// Classify from already-derived metrics.
    pub fn classify(&self, avg_iv: f64, put_call_ratio: f64) -> RegimeAnalysis {
        self.assess(avg_iv, Some(put_call_ratio))
    }

    fn assess(&self, avg_iv: f64, put_call_ratio: Option<f64>) -> RegimeAnalysis {
        let band = REGIME_BANDS
            .iter()
            .find(|band| (band.matches)(avg_iv))
            .unwrap_or(&REGIME_BANDS[REGIME_BANDS.len() - 1]);
        let state = (band.sub_state)(avg_iv, put_call_ratio);
        let profile = state.profile();

        let implication = match (state, put_call_ratio) {
            (RegimeState::Euphoria, None) => UNKNOWN_POSITIONING_IMPLICATION,
            _ => profile.implication,
        };
        let put_call = put_call_ratio
            .map(|r| format!("{:.2}", r))
            .unwrap_or_else(|| "n/a".to_string());
        let reasoning = format!(
            "{} / {:?} (avg IV: {:.1}%, put/call: {})",
            band.regime.name(),
            state,
            avg_iv * 100.0,
            put_call
        );

        RegimeAnalysis {
            regime: band.regime,
            state,
            avg_implied_volatility: avg_iv,
            put_call_ratio,
            implication: implication.to_string(),
            recommendation: profile.recommendation.to_string(),
            signal_adjustment: profile.signal_adjustment,
            reasoning,
        }
    }

    /// Detect the regime from options-channel metadata, falling back to the
    /// aggregate metrics source. `None` when neither carries implied volatility.
    pub fn detect(
        &self,
        options_signals: &[SentimentSignal],
        metrics: Option<&OptionsMetrics>,
    ) -> Option<RegimeAnalysis> {
        let ivs: Vec<f64> = options_signals
            .iter()
            .filter_map(|s| s.metadata.as_options())
            .filter_map(|m| m.implied_volatility)
            .filter(|v| v.is_finite() && *v >= 0.0)
            .collect();
        let ratios: Vec<f64> = options_signals
            .iter()
            .filter_map(|s| s.metadata.as_options())
            .filter_map(|m| m.put_call_ratio)
            .filter(|r| r.is_finite() && *r >= 0.0)
            .collect();

        let avg_iv = if !ivs.is_empty() {
            math::mean(&ivs)
        } else {
            metrics
                .and_then(|m| m.avg_implied_volatility)
                .filter(|v| v.is_finite() && *v >= 0.0)?
        };

        let put_call_ratio = if !ratios.is_empty() {
            Some(math::mean(&ratios))
        } else {
            metrics
                .and_then(|m| m.put_call_ratio.or(m.put_call_oi_ratio))
                .filter(|r| r.is_finite() && *r >= 0.0)
        };

        let analysis = self.assess(avg_iv, put_call_ratio);
        tracing::debug!("Regime detected: {}", analysis.reasoning);
        Some(analysis)
    }
}
