//! One-call analysis of a bar snapshot.

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::domain::{AssistantContext, Bar, Signal, TradeSetup};
use crate::indicators::IndicatorSet;
use crate::setup::generate_trade_setup;
use crate::signal::synthesize;

/// Signal, setup and assistant context for the latest bar of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub pair: String,
    /// Epoch seconds of the analyzed bar, `None` for an empty snapshot.
    pub time: Option<i64>,
    pub price: Option<f64>,
    pub signal: Signal,
    pub setup: TradeSetup,
    pub context: AssistantContext,
}

/// Compute indicators once and derive everything from them.
pub fn analyze(pair: &str, bars: &[Bar], config: &AnalysisConfig) -> Analysis {
    let indicators = IndicatorSet::compute(bars, &config.indicators);
    analyze_with(pair, bars, &indicators, config)
}

/// As `analyze`, reusing indicators already computed over `bars`.
pub fn analyze_with(
    pair: &str,
    bars: &[Bar],
    indicators: &IndicatorSet,
    config: &AnalysisConfig,
) -> Analysis {
    let signal = synthesize(bars, indicators, config);
    let setup = generate_trade_setup(bars, indicators, &signal, config);
    Analysis {
        pair: pair.to_string(),
        time: bars.last().map(|b| b.time),
        price: bars.last().map(|b| b.close),
        context: AssistantContext::from_signal(pair, &signal),
        signal,
        setup,
    }
}
