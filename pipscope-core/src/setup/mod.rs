//! Trade setup generation.
//!
//! A directional signal becomes a concrete plan: entry at the last close,
//! ATR-scaled stop and target on the correct sides of entry, a bounded
//! probability from `probability::score`, and chart levels.

pub mod probability;

pub use probability::{score, ProbabilityBreakdown};

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::domain::{ActiveSetup, Bar, Direction, LevelKind, SetupLevel, Signal, TradeSetup};
use crate::indicators::IndicatorSet;
use crate::series::last_defined;

const RANGING_MESSAGE: &str = "No clear setup - market is ranging";
const RANGING_SUGGESTION: &str = "Wait for stronger directional signals";

/// Derive a trade setup from `signal` and the indicators computed over `bars`.
pub fn generate_trade_setup(
    bars: &[Bar],
    indicators: &IndicatorSet,
    signal: &Signal,
    config: &AnalysisConfig,
) -> TradeSetup {
    let Some(last) = bars.last() else {
        return insufficient_history(config);
    };
    if bars.len() < config.setup.min_bars {
        return insufficient_history(config);
    }
    let Some(direction) = Direction::from_label(signal.label) else {
        return TradeSetup::Inactive {
            message: RANGING_MESSAGE.to_string(),
            suggestion: RANGING_SUGGESTION.to_string(),
        };
    };
    let atr = match last_defined(&indicators.atr) {
        Some(atr) if atr > 0.0 => atr,
        _ => {
            return TradeSetup::Inactive {
                message: "Volatility unavailable - ATR could not be computed".to_string(),
                suggestion: RANGING_SUGGESTION.to_string(),
            }
        }
    };

    let entry = last.close;
    let sign = direction.sign();
    let stop_loss = entry - sign * config.setup.stop_atr_multiplier * atr;
    let take_profit = entry + sign * config.setup.target_atr_multiplier * atr;
    let risk = (entry - stop_loss).abs();
    let reward = (take_profit - entry).abs();
    let risk_reward = round_to(reward / risk, 2);

    let breakdown = score(indicators, direction, signal.confidence, entry, config);
    let probability =
        breakdown.probability(config.setup.min_probability, config.setup.max_probability);

    debug!(
        %direction,
        entry,
        stop_loss,
        take_profit,
        probability,
        score = breakdown.total(),
        "trade setup"
    );

    TradeSetup::Active(ActiveSetup {
        direction,
        entry,
        stop_loss,
        take_profit,
        risk_reward,
        probability,
        atr,
        levels: chart_levels(indicators, entry, config),
        reasons: signal.reasons.clone(),
    })
}

/// EMA, band and clustered support/resistance levels for charting.
pub fn chart_levels(indicators: &IndicatorSet, price: f64, config: &AnalysisConfig) -> Vec<SetupLevel> {
    let trend = &config.indicators.trend;
    let mut levels = Vec::new();

    for period in [trend.medium, trend.slow] {
        if let Some(ema) = indicators.ema(period).and_then(last_defined) {
            let kind = if price > ema {
                LevelKind::Support
            } else {
                LevelKind::Resistance
            };
            levels.push(level(ema, kind, format!("EMA {period}"), None));
        }
    }

    if let Some(upper) = last_defined(&indicators.bollinger.upper) {
        levels.push(level(upper, LevelKind::Resistance, "BB Upper".to_string(), None));
    }
    if let Some(lower) = last_defined(&indicators.bollinger.lower) {
        levels.push(level(lower, LevelKind::Support, "BB Lower".to_string(), None));
    }

    for (i, cluster) in indicators
        .levels
        .iter()
        .take(config.setup.max_cluster_levels)
        .enumerate()
    {
        let prefix = match cluster.kind {
            LevelKind::Support => 'S',
            LevelKind::Resistance => 'R',
        };
        levels.push(level(
            cluster.price,
            cluster.kind,
            format!("{prefix}{}", i + 1),
            Some(cluster.strength),
        ));
    }

    levels
}

fn level(price: f64, kind: LevelKind, label: String, strength: Option<u32>) -> SetupLevel {
    SetupLevel {
        price,
        kind,
        label,
        strength,
    }
}

fn insufficient_history(config: &AnalysisConfig) -> TradeSetup {
    TradeSetup::Inactive {
        message: "Insufficient data for a trade setup".to_string(),
        suggestion: format!("Load at least {} bars of history", config.setup.min_bars),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
