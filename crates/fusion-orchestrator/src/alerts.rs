//! Actionable alerts derived from a finished composite report.
//!
//! Every check is stateless and yields at most one alert. The combined list is
//! stable-sorted by priority tier, so alerts within a tier keep check order.

use catalyst_detector::CatalystImpact;
use market_regime_detector::RegimeState;
use sentiment_analysis::DivergenceType;
use serde::{Deserialize, Serialize};

use crate::report::{CompositeReport, DataDepth};

/// Declaration order is sort order: HIGH first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertUrgency {
    Immediate,
    Soon,
    Monitor,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    Divergence,
    Momentum,
    SmartMoney,
    Regime,
    Catalyst,
    HighConviction,
    FearGreed,
    DataQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub priority: AlertPriority,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub title: String,
    pub message: String,
    pub action: String,
    pub urgency: AlertUrgency,
}

impl Alert {
    fn new(
        priority: AlertPriority,
        alert_type: AlertType,
        urgency: AlertUrgency,
        title: impl Into<String>,
        message: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            priority,
            alert_type,
            title: title.into(),
            message: message.into(),
            action: action.into(),
            urgency,
        }
    }
}

type AlertCheck = fn(&CompositeReport) -> Option<Alert>;

/// Checks in insertion order
const ALERT_CHECKS: [AlertCheck; 8] = [
    divergence_alert,
    momentum_alert,
    smart_money_alert,
    regime_alert,
    catalyst_alert,
    conviction_alert,
    fear_greed_alert,
    sparsity_alert,
];

#[derive(Debug, Default)]
pub struct AlertGenerator;

impl AlertGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, report: &CompositeReport) -> Vec<Alert> {
        let alerts = ALERT_CHECKS.iter().filter_map(|check| check(report)).collect();
        prioritize(alerts)
    }
}

/// Stable sort by priority tier.
pub fn prioritize(mut alerts: Vec<Alert>) -> Vec<Alert> {
    alerts.sort_by_key(|a| a.priority);
    alerts
}

fn divergence_alert(report: &CompositeReport) -> Option<Alert> {
    let div = &report.divergence;
    if div.divergence_type == DivergenceType::Aligned {
        return None;
    }
    let (priority, urgency) = if div.opportunity_score > 0.5 {
        (AlertPriority::High, AlertUrgency::Immediate)
    } else if div.opportunity_score > 0.3 {
        (AlertPriority::Medium, AlertUrgency::Soon)
    } else {
        return None;
    };
    let action = match div.divergence_type {
        DivergenceType::BullishDivergence => "Look for an entry as positioning leads the narrative",
        DivergenceType::BearishDivergence => "Consider hedging or trimming exposure",
        _ => "Wait for the channels to converge before acting",
    };
    Some(Alert::new(
        priority,
        AlertType::Divergence,
        urgency,
        format!("{} detected", div.divergence_type.as_str()),
        format!("{} (opportunity {:.2})", div.message, div.opportunity_score),
        action,
    ))
}

fn momentum_alert(report: &CompositeReport) -> Option<Alert> {
    let momentum = report.advanced_metrics.momentum.blended;
    let (priority, urgency, strength) = if momentum.abs() > 0.6 {
        (AlertPriority::High, AlertUrgency::Soon, "Strong")
    } else if momentum.abs() > 0.35 {
        (AlertPriority::Medium, AlertUrgency::Monitor, "Building")
    } else {
        return None;
    };
    let direction = if momentum > 0.0 { "bullish" } else { "bearish" };
    let mut message = format!("Blended momentum is {:+.2} ({})", momentum, direction);
    if let Some(note) = &report.advanced_metrics.momentum.divergence_note {
        message.push_str(". ");
        message.push_str(note);
    }
    Some(Alert::new(
        priority,
        AlertType::Momentum,
        urgency,
        format!("{} {} momentum", strength, direction),
        message,
        if momentum > 0.0 {
            "Ride the trend with a trailing stop"
        } else {
            "Avoid catching the falling knife; wait for stabilization"
        },
    ))
}

fn smart_money_alert(report: &CompositeReport) -> Option<Alert> {
    let factor = report.smart_money_factor;
    if factor.abs() <= 0.6 {
        return None;
    }
    let side = if factor > 0.0 { "bullish" } else { "bearish" };
    Some(Alert::new(
        AlertPriority::Medium,
        AlertType::SmartMoney,
        AlertUrgency::Soon,
        format!("Institutional positioning is {}", side),
        format!("Smart-money factor {:+.2} from options positioning", factor),
        format!("Weigh the {} options flow above retail narrative", side),
    ))
}

fn regime_alert(report: &CompositeReport) -> Option<Alert> {
    let regime = report.regime.as_ref().filter(|r| r.regime.is_extreme())?;
    let (priority, urgency) = match regime.state {
        RegimeState::Panic => (AlertPriority::High, AlertUrgency::Immediate),
        RegimeState::Euphoria => (AlertPriority::Medium, AlertUrgency::Soon),
        RegimeState::Complacent => (AlertPriority::Low, AlertUrgency::Monitor),
        _ => return None,
    };
    Some(Alert::new(
        priority,
        AlertType::Regime,
        urgency,
        format!("{} regime: {:?}", regime.regime.name(), regime.state),
        regime.implication.clone(),
        regime.recommendation.clone(),
    ))
}

fn catalyst_alert(report: &CompositeReport) -> Option<Alert> {
    let top = report.catalysts.top()?;
    let (priority, urgency) = match report.catalysts.assessment {
        CatalystImpact::HighImpact => (AlertPriority::High, AlertUrgency::Immediate),
        CatalystImpact::ModerateImpact => (AlertPriority::Medium, AlertUrgency::Soon),
        _ => return None,
    };
    Some(Alert::new(
        priority,
        AlertType::Catalyst,
        urgency,
        format!("{} catalyst", top.category.name()),
        format!("{} (impact {:.2})", top.headline, top.impact_score),
        report.catalysts.recommendation.clone(),
    ))
}

fn conviction_alert(report: &CompositeReport) -> Option<Alert> {
    if report.conviction_score <= 0.7 || report.final_score.abs() <= 0.5 {
        return None;
    }
    Some(Alert::new(
        AlertPriority::High,
        AlertType::HighConviction,
        AlertUrgency::Soon,
        format!("High-conviction {}", report.classification.to_label()),
        format!(
            "Channels agree (conviction {:.2}) on a composite score of {:+.2}",
            report.conviction_score, report.final_score
        ),
        "Act on the signal with normal position sizing",
    ))
}

fn fear_greed_alert(report: &CompositeReport) -> Option<Alert> {
    let fg = &report.advanced_metrics.fear_greed;
    if fg.adjustment < 0.0 {
        Some(Alert::new(
            AlertPriority::Medium,
            AlertType::FearGreed,
            AlertUrgency::Monitor,
            "Fear dominates the news flow",
            format!(
                "Negative coverage ({:.2}) outweighs positive ({:.2}); composite adjusted {:+.2}",
                fg.negative_mean, fg.positive_mean, fg.adjustment
            ),
            "Expect exaggerated downside reactions to further bad news",
        ))
    } else if fg.adjustment > 0.0 {
        Some(Alert::new(
            AlertPriority::Low,
            AlertType::FearGreed,
            AlertUrgency::Info,
            "Greed dominates the news flow",
            format!(
                "Positive coverage ({:.2}) outweighs negative ({:.2}); composite adjusted {:+.2}",
                fg.positive_mean, fg.negative_mean, fg.adjustment
            ),
            "Watch for complacency in the narrative",
        ))
    } else {
        None
    }
}

fn sparsity_alert(report: &CompositeReport) -> Option<Alert> {
    if report.metadata.data_depth != DataDepth::Sparse {
        return None;
    }
    Some(Alert::new(
        AlertPriority::Low,
        AlertType::DataQuality,
        AlertUrgency::Info,
        "Limited data",
        format!(
            "Only {} channel(s) and {} signal(s) available",
            report.metadata.channels_present, report.metadata.total_signals
        ),
        "Treat this report as low-confidence until more data arrives",
    ))
}
