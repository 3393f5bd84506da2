use analysis_core::{ConfigAdvisor, TickerConfig};

/// Resolve the per-run config. The advisor is consulted once; its suggestion is
/// clipped into bounds, and absence or failure falls back to the defaults.
pub async fn resolve_config(symbol: &str, advisor: Option<&dyn ConfigAdvisor>) -> TickerConfig {
    let Some(advisor) = advisor else {
        return TickerConfig::default();
    };

    match advisor.suggest(symbol).await {
        Ok(Some(candidate)) => {
            let config = candidate.resolve();
            tracing::debug!("Using advisor config for {}: {:?}", symbol, config);
            config
        }
        Ok(None) => {
            tracing::debug!("Advisor has no config for {}, using defaults", symbol);
            TickerConfig::default()
        }
        Err(e) => {
            tracing::warn!("Config advisor failed for {}, using defaults: {}", symbol, e);
            TickerConfig::default()
        }
    }
}
