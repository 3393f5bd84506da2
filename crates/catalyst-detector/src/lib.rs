//! News catalyst detection.
//!
//! Scans the most recent news records against fixed keyword tables, scores each
//! hit by category weight, keyword coverage and record sentiment, and keeps the
//! strongest instance per category.

use analysis_core::{math, SentimentSignal};
use serde::{Deserialize, Serialize};

/// How many of the most recent records are scanned
pub const DEFAULT_SCAN_LIMIT: usize = 20;
/// Keyword hits needed for full confidence
const FULL_CONFIDENCE_MATCHES: f64 = 3.0;
const MODERATE_IMPACT_THRESHOLD: f64 = 0.4;
const HIGH_IMPACT_THRESHOLD: f64 = 0.7;
const DIRECTIONAL_SENTIMENT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalystCategory {
    Financial,
    Regulatory,
    CorporateAction,
    Product,
    Legal,
    Management,
    AnalystAction,
}

impl CatalystCategory {
    pub fn name(&self) -> &'static str {
        match self {
            CatalystCategory::Financial => "Financial",
            CatalystCategory::Regulatory => "Regulatory",
            CatalystCategory::CorporateAction => "Corporate Action",
            CatalystCategory::Product => "Product",
            CatalystCategory::Legal => "Legal",
            CatalystCategory::Management => "Management",
            CatalystCategory::AnalystAction => "Analyst Action",
        }
    }
}

/// One keyword table. Keywords are lowercase and matched on word boundaries
/// after punctuation is stripped, so "spin-off" is listed as "spin off".
pub struct CatalystRule {
    pub category: CatalystCategory,
    pub weight: f64,
    pub keywords: &'static [&'static str],
}

pub const CATALYST_RULES: [CatalystRule; 7] = [
    CatalystRule {
        category: CatalystCategory::Financial,
        weight: 0.9,
        keywords: &[
            "earnings", "revenue", "guidance", "profit", "eps", "quarterly results",
            "dividend", "margins", "outlook", "forecast",
        ],
    },
    CatalystRule {
        category: CatalystCategory::Regulatory,
        weight: 0.85,
        keywords: &[
            "fda", "sec", "approval", "antitrust", "regulator", "regulatory",
            "investigation", "compliance", "ban",
        ],
    },
    CatalystRule {
        category: CatalystCategory::CorporateAction,
        weight: 0.8,
        keywords: &[
            "merger", "acquisition", "acquire", "acquires", "buyout", "takeover",
            "spin off", "spinoff", "buyback", "stock split", "ipo",
        ],
    },
    CatalystRule {
        category: CatalystCategory::Product,
        weight: 0.6,
        keywords: &[
            "launch", "launches", "product", "recall", "patent", "unveils", "release",
            "partnership",
        ],
    },
    CatalystRule {
        category: CatalystCategory::Legal,
        weight: 0.75,
        keywords: &[
            "lawsuit", "litigation", "settlement", "sued", "court", "indictment",
            "class action", "verdict",
        ],
    },
    CatalystRule {
        category: CatalystCategory::Management,
        weight: 0.65,
        keywords: &[
            "ceo", "cfo", "resigns", "resignation", "appoints", "appointed", "board",
            "executive", "steps down",
        ],
    },
    CatalystRule {
        category: CatalystCategory::AnalystAction,
        weight: 0.7,
        keywords: &[
            "upgrade", "upgraded", "downgrade", "downgraded", "price target",
            "initiates coverage", "outperform", "underperform", "overweight", "underweight",
        ],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalyst {
    pub category: CatalystCategory,
    /// weight × confidence × |sentiment|
    pub impact_score: f64,
    /// min(matches / 3, 1)
    pub confidence: f64,
    pub sentiment: f64,
    pub matched_keywords: Vec<String>,
    pub headline: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CatalystImpact {
    NoCatalysts,
    LowImpact,
    ModerateImpact,
    HighImpact,
}

impl CatalystImpact {
    pub fn from_max_impact(max_impact: Option<f64>) -> Self {
        match max_impact {
            None => CatalystImpact::NoCatalysts,
            Some(i) if i > HIGH_IMPACT_THRESHOLD => CatalystImpact::HighImpact,
            Some(i) if i > MODERATE_IMPACT_THRESHOLD => CatalystImpact::ModerateImpact,
            Some(_) => CatalystImpact::LowImpact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalystReport {
    /// One per category, strongest first
    pub catalysts: Vec<Catalyst>,
    pub assessment: CatalystImpact,
    pub max_impact: f64,
    pub mean_sentiment: f64,
    pub recommendation: String,
    pub records_scanned: usize,
}

impl CatalystReport {
    pub fn top(&self) -> Option<&Catalyst> {
        self.catalysts.first()
    }
}

pub struct CatalystDetector {
    scan_limit: usize,
}

impl CatalystDetector {
    pub fn new(scan_limit: usize) -> Self {
        Self {
            scan_limit: scan_limit.max(1),
        }
    }

    pub fn detect(&self, news: &[SentimentSignal]) -> CatalystReport {
        let mut recent: Vec<&SentimentSignal> = news.iter().collect();
        // Newest first; unparsable timestamps sort last.
        recent.sort_by(|a, b| b.parsed_timestamp().cmp(&a.parsed_timestamp()));
        recent.truncate(self.scan_limit);

        let mut best: Vec<Catalyst> = Vec::new();
        for record in &recent {
            let text = normalize(&record_text(record));
            if text.trim().is_empty() {
                continue;
            }
            for rule in CATALYST_RULES.iter() {
                if let Some(candidate) = score_record(record, &text, rule) {
                    match best.iter_mut().find(|c| c.category == rule.category) {
                        Some(existing) if candidate.impact_score > existing.impact_score => {
                            *existing = candidate
                        }
                        Some(_) => {}
                        None => best.push(candidate),
                    }
                }
            }
        }

        // Stable: equal impacts keep table order.
        best.sort_by_key(|c| rule_index(c.category));
        best.sort_by(|a, b| {
            b.impact_score
                .partial_cmp(&a.impact_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let max_impact = best.first().map(|c| c.impact_score);
        let assessment = CatalystImpact::from_max_impact(max_impact);
        let sentiments: Vec<f64> = best.iter().map(|c| c.sentiment).collect();
        let mean_sentiment = math::mean(&sentiments);
        let recommendation = recommendation(assessment, mean_sentiment, best.first());

        if !best.is_empty() {
            tracing::debug!(
                "{} catalyst categories detected across {} records (max impact {:.2})",
                best.len(),
                recent.len(),
                max_impact.unwrap_or(0.0)
            );
        }

        CatalystReport {
            catalysts: best,
            assessment,
            max_impact: max_impact.unwrap_or(0.0),
            mean_sentiment,
            recommendation,
            records_scanned: recent.len(),
        }
    }
}

impl Default for CatalystDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_LIMIT)
    }
}

fn rule_index(category: CatalystCategory) -> usize {
    CATALYST_RULES
        .iter()
        .position(|r| r.category == category)
        .unwrap_or(CATALYST_RULES.len())
}

fn score_record(record: &SentimentSignal, text: &str, rule: &CatalystRule) -> Option<Catalyst> {
    let matched: Vec<String> = rule
        .keywords
        .iter()
        .filter(|kw| text.contains(&format!(" {} ", kw)))
        .map(|kw| kw.to_string())
        .collect();
    if matched.is_empty() {
        return None;
    }

    let confidence = (matched.len() as f64 / FULL_CONFIDENCE_MATCHES).min(1.0);
    let sentiment = record.bounded_score();
    let impact_score = rule.weight * confidence * sentiment.abs();
    // A neutral record carries no impact and is not a catalyst.
    if impact_score <= 0.0 {
        return None;
    }

    Some(Catalyst {
        category: rule.category,
        impact_score,
        confidence,
        sentiment,
        matched_keywords: matched,
        headline: headline(record),
        timestamp: record.timestamp.clone(),
    })
}

fn headline(record: &SentimentSignal) -> String {
    record
        .metadata
        .as_news()
        .map(|m| m.title.clone())
        .unwrap_or_default()
}

fn record_text(record: &SentimentSignal) -> String {
    match record.metadata.as_news() {
        Some(meta) => {
            let mut text = meta.title.clone();
            if let Some(desc) = &meta.description {
                text.push(' ');
                text.push_str(desc);
            }
            if text.trim().is_empty() {
                if let Some(serde_json::Value::String(raw)) = meta.extra.get("text") {
                    text = raw.clone();
                }
            }
            text
        }
        None => String::new(),
    }
}

/// Lowercase, strip punctuation to spaces and pad so every keyword can be
/// matched as ` keyword `.
fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    format!(" {} ", words.join(" "))
}

fn recommendation(assessment: CatalystImpact, mean_sentiment: f64, top: Option<&Catalyst>) -> String {
    let base = match (assessment, top) {
        (CatalystImpact::NoCatalysts, _) | (_, None) => {
            return "No significant catalysts detected in recent news".to_string()
        }
        (CatalystImpact::HighImpact, Some(top)) => format!(
            "High-impact {} catalyst: expect an outsized move, size positions accordingly",
            top.category.name().to_lowercase()
        ),
        (CatalystImpact::ModerateImpact, Some(top)) => format!(
            "Moderate {} catalyst: monitor for follow-through",
            top.category.name().to_lowercase()
        ),
        (CatalystImpact::LowImpact, Some(_)) => {
            "Minor catalysts only: unlikely to move the price on their own".to_string()
        }
    };

    if mean_sentiment > DIRECTIONAL_SENTIMENT {
        format!("{base}. Catalysts lean bullish")
    } else if mean_sentiment < -DIRECTIONAL_SENTIMENT {
        format!("{base}. Catalysts lean bearish")
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{NewsMeta, SignalMetadata, SignalSource};

    fn article(ts: &str, title: &str, score: f64) -> SentimentSignal {
        SentimentSignal::new(ts, SignalSource::News, score, 0.8, 1).with_metadata(
            SignalMetadata::News(NewsMeta {
                title: title.to_string(),
                ..Default::default()
            }),
        )
    }

    #[test]
    fn test_single_financial_keyword_literal_impact() {
        let report = CatalystDetector::default()
            .detect(&[article("2024-05-01", "Company reports earnings", 0.6)]);

        assert_eq!(report.catalysts.len(), 1);
        let c = &report.catalysts[0];
        assert_eq!(c.category, CatalystCategory::Financial);
        assert!((c.confidence - 1.0 / 3.0).abs() < 1e-12);
        assert!((c.impact_score - 0.18).abs() < 1e-9);
        assert_eq!(report.assessment, CatalystImpact::LowImpact);
        assert!(report.max_impact < 0.4);
    }

    #[test]
    fn test_neutral_record_is_not_a_catalyst() {
        let report = CatalystDetector::default()
            .detect(&[article("2024-05-01", "Earnings revenue guidance", 0.0)]);
        assert!(report.catalysts.is_empty());
        assert_eq!(report.assessment, CatalystImpact::NoCatalysts);
        assert_eq!(report.max_impact, 0.0);
        assert_eq!(report.records_scanned, 1);
    }

    #[test]
    fn test_keywords_match_on_word_boundaries() {
        let report = CatalystDetector::default()
            .detect(&[article("2024-05-01", "Next steps for the banner campaign", 0.9)]);
        assert!(report.catalysts.is_empty());
        assert_eq!(report.assessment, CatalystImpact::NoCatalysts);
    }

    #[test]
    fn test_dedup_keeps_max_impact_per_category() {
        let report = CatalystDetector::default().detect(&[
            article("2024-05-01", "Quarterly earnings beat", 0.3),
            article("2024-05-02", "Earnings and revenue surge, guidance raised", 0.9),
        ]);

        let financial: Vec<&Catalyst> = report
            .catalysts
            .iter()
            .filter(|c| c.category == CatalystCategory::Financial)
            .collect();
        assert_eq!(financial.len(), 1);
        // three keywords -> full confidence: 0.9 × 1.0 × 0.9
        assert!((financial[0].impact_score - 0.81).abs() < 1e-9);
        assert_eq!(report.assessment, CatalystImpact::HighImpact);
        assert!(report.recommendation.contains("lean bullish"));
    }

    #[test]
    fn test_sorted_by_impact_descending() {
        let report = CatalystDetector::default().detect(&[
            article("2024-05-01", "CEO resigns amid lawsuit", -0.8),
            article("2024-05-02", "FDA approval granted, antitrust probe closed", 0.5),
        ]);
        let impacts: Vec<f64> = report.catalysts.iter().map(|c| c.impact_score).collect();
        assert!(impacts.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(report.catalysts.len(), 3);
    }

    #[test]
    fn test_only_most_recent_records_scanned() {
        let detector = CatalystDetector::new(1);
        let report = detector.detect(&[
            article("2024-05-01", "Merger announced", 0.9),
            article("2024-05-03", "Nothing to see", 0.1),
            article("garbage", "Takeover bid", 0.9),
        ]);
        assert_eq!(report.records_scanned, 1);
        assert!(report.catalysts.is_empty());
    }

    #[test]
    fn test_bearish_direction_note() {
        let report = CatalystDetector::default()
            .detect(&[article("2024-05-01", "Analyst downgrade, price target cut", -0.7)]);
        assert_eq!(report.catalysts[0].category, CatalystCategory::AnalystAction);
        assert!(report.recommendation.contains("lean bearish"));
    }

    #[test]
    fn test_rule_table_order() {
        let order: Vec<CatalystCategory> = CATALYST_RULES.iter().map(|r| r.category).collect();
        assert_eq!(order[0], CatalystCategory::Financial);
        assert_eq!(order[6], CatalystCategory::AnalystAction);
    }
}
