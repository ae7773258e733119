//! Per-indicator voting rules.
//!
//! Each rule reads last-bar (and for MACD, previous-bar) readings and returns
//! at most one vote. A rule with missing inputs casts no vote at all; that is
//! different from an explicit neutral vote, which still counts toward the
//! agreement ratio.

use crate::config::{IndicatorConfig, SignalConfig};
use crate::domain::{Vote, VoteSource};

/// RSI zones: oversold +2, buy zone +1, sell zone -1, overbought -2, else 0.
pub fn rsi_vote(rsi: Option<f64>, indicators: &IndicatorConfig, signal: &SignalConfig) -> Option<Vote> {
    let rsi = rsi?;
    let vote = if rsi < indicators.rsi.oversold {
        Vote::new(
            VoteSource::Rsi,
            2,
            format!("RSI ({rsi:.1}) indicates oversold conditions"),
        )
    } else if rsi > indicators.rsi.overbought {
        Vote::new(
            VoteSource::Rsi,
            -2,
            format!("RSI ({rsi:.1}) indicates overbought conditions"),
        )
    } else if rsi < signal.rsi_buy_zone {
        Vote::new(
            VoteSource::Rsi,
            1,
            format!("RSI ({rsi:.1}) suggests buying opportunity"),
        )
    } else if rsi > signal.rsi_sell_zone {
        Vote::new(
            VoteSource::Rsi,
            -1,
            format!("RSI ({rsi:.1}) suggests selling opportunity"),
        )
    } else {
        Vote::neutral(VoteSource::Rsi)
    };
    Some(vote)
}

/// MACD line vs. signal line at the latest bar and the one before it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdReading {
    pub prev_line: f64,
    pub prev_signal: f64,
    pub line: f64,
    pub signal: f64,
}

impl MacdReading {
    pub fn from_options(
        prev_line: Option<f64>,
        prev_signal: Option<f64>,
        line: Option<f64>,
        signal: Option<f64>,
    ) -> Option<Self> {
        Some(Self {
            prev_line: prev_line?,
            prev_signal: prev_signal?,
            line: line?,
            signal: signal?,
        })
    }

    pub fn is_bullish_crossover(&self) -> bool {
        self.prev_line < self.prev_signal && self.line > self.signal
    }

    pub fn is_bearish_crossover(&self) -> bool {
        self.prev_line > self.prev_signal && self.line < self.signal
    }
}

/// Crossovers vote ±2, otherwise the side of the signal line votes ±1.
pub fn macd_vote(reading: Option<MacdReading>) -> Option<Vote> {
    let r = reading?;
    let vote = if r.is_bullish_crossover() {
        Vote::new(VoteSource::Macd, 2, "MACD bullish crossover detected")
    } else if r.is_bearish_crossover() {
        Vote::new(VoteSource::Macd, -2, "MACD bearish crossover detected")
    } else if r.line > r.signal {
        Vote::new(
            VoteSource::Macd,
            1,
            "MACD above signal line (bullish momentum)",
        )
    } else {
        Vote::new(
            VoteSource::Macd,
            -1,
            "MACD below signal line (bearish momentum)",
        )
    };
    Some(vote)
}

/// Full EMA stack votes ±2, otherwise the side of the medium EMA votes ±1.
pub fn trend_vote(
    price: f64,
    fast: Option<f64>,
    medium: Option<f64>,
    slow: Option<f64>,
    medium_period: usize,
) -> Option<Vote> {
    let (fast, medium, slow) = (fast?, medium?, slow?);
    let vote = if price > fast && fast > medium && medium > slow {
        Vote::new(
            VoteSource::EmaTrend,
            2,
            "Strong uptrend: Price above all EMAs in bullish alignment",
        )
    } else if price < fast && fast < medium && medium < slow {
        Vote::new(
            VoteSource::EmaTrend,
            -2,
            "Strong downtrend: Price below all EMAs in bearish alignment",
        )
    } else if price > medium {
        Vote::new(
            VoteSource::EmaTrend,
            1,
            format!("Price above {medium_period} EMA suggests bullish bias"),
        )
    } else if price < medium {
        Vote::new(
            VoteSource::EmaTrend,
            -1,
            format!("Price below {medium_period} EMA suggests bearish bias"),
        )
    } else {
        Vote::neutral(VoteSource::EmaTrend)
    };
    Some(vote)
}

/// Band touches vote ±1; inside the bands no vote is cast.
pub fn bollinger_vote(price: f64, upper: Option<f64>, lower: Option<f64>) -> Option<Vote> {
    let (upper, lower) = (upper?, lower?);
    if price <= lower {
        Some(Vote::new(
            VoteSource::Bollinger,
            1,
            "Price at lower Bollinger Band (potential bounce)",
        ))
    } else if price >= upper {
        Some(Vote::new(
            VoteSource::Bollinger,
            -1,
            "Price at upper Bollinger Band (potential reversal)",
        ))
    } else {
        None
    }
}
