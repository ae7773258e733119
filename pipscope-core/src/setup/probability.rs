//! Confluence scoring for a directional setup.
//!
//! Five checks award points toward a fixed maximum of 85. The achieved ratio
//! is rescaled to `round(ratio * 75 * 0.75 + 25)` and clamped, so the score
//! never claims near-certainty or near-impossibility.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::domain::Direction;
use crate::indicators::IndicatorSet;
use crate::series::last_defined;

pub const RSI_MAX: u32 = 15;
pub const MACD_MAX: u32 = 15;
pub const TREND_MAX: u32 = 20;
pub const BOLLINGER_MAX: u32 = 15;
pub const CONFIDENCE_MAX: u32 = 20;
pub const MAX_SCORE: u32 = RSI_MAX + MACD_MAX + TREND_MAX + BOLLINGER_MAX + CONFIDENCE_MAX;

/// RSI midline separating the weaker alignment tier.
const RSI_MIDLINE: f64 = 50.0;
/// How close to a band still counts as touching it.
const BAND_PROXIMITY: f64 = 0.01;

/// Points awarded by each check. A check with missing inputs scores 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbabilityBreakdown {
    pub rsi: u32,
    pub macd: u32,
    pub trend: u32,
    pub bollinger: u32,
    pub confidence: u32,
}

impl ProbabilityBreakdown {
    pub fn total(&self) -> u32 {
        self.rsi + self.macd + self.trend + self.bollinger + self.confidence
    }

    /// Rescaled, clamped probability.
    pub fn probability(&self, min: u8, max: u8) -> u8 {
        let ratio = f64::from(self.total()) / f64::from(MAX_SCORE);
        let scaled = (ratio * 75.0 * 0.75 + 25.0).round();
        scaled.clamp(f64::from(min), f64::from(max)) as u8
    }
}

/// Score the confluence of the latest indicator readings with `direction`.
pub fn score(
    indicators: &IndicatorSet,
    direction: Direction,
    confidence: u8,
    price: f64,
    config: &AnalysisConfig,
) -> ProbabilityBreakdown {
    let long = direction == Direction::Long;
    let trend = &config.indicators.trend;
    let ema = |period: usize| indicators.ema(period).and_then(last_defined);

    let rsi = last_defined(&indicators.rsi).map_or(0, |rsi| {
        if long && rsi < config.signal.rsi_buy_zone {
            15
        } else if long && rsi < RSI_MIDLINE {
            10
        } else if !long && rsi > config.signal.rsi_sell_zone {
            15
        } else if !long && rsi > RSI_MIDLINE {
            10
        } else {
            5
        }
    });

    let macd = match (
        last_defined(&indicators.macd.line),
        last_defined(&indicators.macd.signal),
    ) {
        (Some(line), Some(signal)) => {
            if (long && line > signal) || (!long && line < signal) {
                15
            } else {
                5
            }
        }
        _ => 0,
    };

    let trend_points = match (ema(trend.medium), ema(trend.slow)) {
        (Some(medium), Some(slow)) => {
            let (stacked, beyond) = if long {
                (price > medium && medium > slow, price > medium)
            } else {
                (price < medium && medium < slow, price < medium)
            };
            if stacked {
                20
            } else if beyond {
                12
            } else {
                5
            }
        }
        _ => 0,
    };

    let bollinger = match (
        last_defined(&indicators.bollinger.upper),
        last_defined(&indicators.bollinger.middle),
        last_defined(&indicators.bollinger.lower),
    ) {
        (Some(upper), Some(middle), Some(lower)) => {
            if long && price <= lower * (1.0 + BAND_PROXIMITY) {
                15
            } else if !long && price >= upper * (1.0 - BAND_PROXIMITY) {
                15
            } else if (long && price < middle) || (!long && price > middle) {
                10
            } else {
                5
            }
        }
        _ => 0,
    };

    let confidence = match confidence {
        80..=u8::MAX => 20,
        70..=79 => 15,
        60..=69 => 10,
        _ => 5,
    };

    ProbabilityBreakdown {
        rsi,
        macd,
        trend: trend_points,
        bollinger,
        confidence,
    }
}
