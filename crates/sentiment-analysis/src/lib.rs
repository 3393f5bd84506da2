//! Sentiment scoring components.
//!
//! Each component is a small synchronous scorer over already-loaded signals.
//! None of them perform I/O or read the wall clock; ages are measured against
//! an explicit `as_of` instant supplied by the caller.

pub mod asymmetry;
pub mod conviction;
pub mod decay;
pub mod divergence;
pub mod momentum;

pub use asymmetry::{FearGreedAdjuster, FearGreedAnalysis, SentimentBias};
pub use conviction::ConvictionScorer;
pub use decay::{DecayedChannel, TemporalDecayWeighter, UNPARSABLE_TIMESTAMP_WEIGHT};
pub use divergence::{DivergenceAnalysis, DivergenceDetector, DivergenceRule, DivergenceType, DIVERGENCE_RULES};
pub use momentum::{MomentumAnalysis, MomentumTrend, SmartMomentumAnalyzer};
