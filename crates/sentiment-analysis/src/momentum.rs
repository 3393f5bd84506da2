//! Smart Momentum Module
//!
//! Blends three independently clipped momentum readings: price return over the
//! window, the velocity of news sentiment, and the recent volume surge. Any
//! reading without enough history contributes 0 instead of failing.

use analysis_core::{math, Bar, SentimentSignal};
use serde::{Deserialize, Serialize};

const PRICE_WEIGHT: f64 = 0.5;
const VELOCITY_WEIGHT: f64 = 0.3;
const VOLUME_WEIGHT: f64 = 0.2;

const PRICE_SCALE: f64 = 5.0;
const VELOCITY_SCALE: f64 = 2.0;
const VOLUME_SCALE: f64 = 2.0;
const RECENT_VOLUME_PERIODS: usize = 3;

/// Gap between price and narrative momentum that earns an advisory note
const DIVERGENCE_NOTE_GAP: f64 = 0.5;

/// Coarse label for the blended momentum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MomentumTrend {
    StrongUp,
    Up,
    Flat,
    Down,
    StrongDown,
}

impl MomentumTrend {
    pub fn from_value(momentum: f64) -> Self {
        if momentum > 0.5 {
            MomentumTrend::StrongUp
        } else if momentum > 0.15 {
            MomentumTrend::Up
        } else if momentum < -0.5 {
            MomentumTrend::StrongDown
        } else if momentum < -0.15 {
            MomentumTrend::Down
        } else {
            MomentumTrend::Flat
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MomentumTrend::StrongUp => "Strong Up",
            MomentumTrend::Up => "Up",
            MomentumTrend::Flat => "Flat",
            MomentumTrend::Down => "Down",
            MomentumTrend::StrongDown => "Strong Down",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumAnalysis {
    /// 50/30/20 blend of the three readings, in [-1, 1]
    pub blended: f64,
    pub price_momentum: f64,
    pub velocity_momentum: f64,
    pub volume_momentum: f64,
    pub trend: MomentumTrend,
    /// Advisory only; never alters `blended`
    pub divergence_note: Option<String>,
}

pub struct SmartMomentumAnalyzer {
    window: usize,
}

impl SmartMomentumAnalyzer {
    pub fn new(window_days: u32) -> Self {
        Self {
            window: (window_days as usize).max(1),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn analyze(&self, bars: &[Bar], news: &[SentimentSignal]) -> MomentumAnalysis {
        let mut sorted_bars: Vec<&Bar> = bars.iter().collect();
        sorted_bars.sort_by_key(|b| b.timestamp);

        let price_momentum = self.price_momentum(&sorted_bars);
        let velocity_momentum = self.velocity_momentum(news);
        let volume_momentum = self.volume_momentum(&sorted_bars);

        let blended = math::clip(
            price_momentum * PRICE_WEIGHT
                + velocity_momentum * VELOCITY_WEIGHT
                + volume_momentum * VOLUME_WEIGHT,
            -1.0,
            1.0,
        );

        let divergence_note = Self::divergence_note(price_momentum, velocity_momentum);

        tracing::debug!(
            "momentum: price={:.3} velocity={:.3} volume={:.3} blended={:.3}",
            price_momentum,
            velocity_momentum,
            volume_momentum,
            blended
        );

        MomentumAnalysis {
            blended,
            price_momentum,
            velocity_momentum,
            volume_momentum,
            trend: MomentumTrend::from_value(blended),
            divergence_note,
        }
    }

    /// N-day return × 5, clipped. Needs more than N bars.
    fn price_momentum(&self, sorted: &[&Bar]) -> f64 {
        if sorted.len() <= self.window {
            return 0.0;
        }
        let last = sorted[sorted.len() - 1].close;
        let base = sorted[sorted.len() - 1 - self.window].close;
        if !base.is_finite() || base <= 0.0 {
            return 0.0;
        }
        let ret = math::safe_div(last - base, base, 0.0);
        math::clip(ret * PRICE_SCALE, -1.0, 1.0)
    }

    /// (recent window mean − prior window mean) × 2, clipped. Needs ≥ 2 signals.
    fn velocity_momentum(&self, news: &[SentimentSignal]) -> f64 {
        if news.len() < 2 {
            return 0.0;
        }

        // Unparsable timestamps sort as oldest; the sort is stable.
        let mut ordered: Vec<&SentimentSignal> = news.iter().collect();
        ordered.sort_by_key(|s| s.parsed_timestamp());

        let values: Vec<f64> = ordered
            .iter()
            .map(|s| s.bounded_score() * s.bounded_confidence())
            .collect();

        let n = values.len();
        let w = self.window.min(n / 2);
        if w == 0 {
            return 0.0;
        }

        let recent = math::mean(&values[n - w..]);
        let prior = math::mean(&values[n - 2 * w..n - w]);
        math::clip((recent - prior) * VELOCITY_SCALE, -1.0, 1.0)
    }

    /// (3-period average volume / N-period average volume − 1) × 2, clipped.
    /// Needs a full window.
    fn volume_momentum(&self, sorted: &[&Bar]) -> f64 {
        let window = self.window.max(RECENT_VOLUME_PERIODS);
        if sorted.len() < window {
            return 0.0;
        }

        let volumes: Vec<f64> = sorted.iter().map(|b| math::finite_or(b.volume, 0.0)).collect();
        let n = volumes.len();
        let recent = math::mean(&volumes[n - RECENT_VOLUME_PERIODS..]);
        let full = math::mean(&volumes[n - window..]);
        if full <= 0.0 {
            return 0.0;
        }
        math::clip((math::safe_div(recent, full, 1.0) - 1.0) * VOLUME_SCALE, -1.0, 1.0)
    }

    fn divergence_note(price: f64, velocity: f64) -> Option<String> {
        if (price - velocity).abs() <= DIVERGENCE_NOTE_GAP {
            return None;
        }
        let note = if price > velocity {
            format!(
                "Price rising despite negative narrative (price {:+.2} vs narrative {:+.2})",
                price, velocity
            )
        } else {
            format!(
                "Narrative improving despite falling price (narrative {:+.2} vs price {:+.2})",
                velocity, price
            )
        };
        Some(note)
    }
}

impl Default for SmartMomentumAnalyzer {
    fn default() -> Self {
        Self::new(analysis_core::MOMENTUM_WINDOW_DAYS.default as u32)
    }
}
