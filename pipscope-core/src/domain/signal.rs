//! Signal: the synthesized directional reading at the latest bar.
//!
//! A signal is produced fresh on every recomputation and never mutated. It
//! carries the per-indicator votes that produced it, so each rule outcome stays
//! inspectable after aggregation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete directional classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalLabel {
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    #[serde(rename = "Strong Sell")]
    StrongSell,
}

impl SignalLabel {
    /// All labels from most bullish to most bearish.
    pub const ALL: [SignalLabel; 5] = [
        SignalLabel::StrongBuy,
        SignalLabel::Buy,
        SignalLabel::Neutral,
        SignalLabel::Sell,
        SignalLabel::StrongSell,
    ];

    pub fn is_bullish(self) -> bool {
        matches!(self, Self::StrongBuy | Self::Buy)
    }

    pub fn is_bearish(self) -> bool {
        matches!(self, Self::StrongSell | Self::Sell)
    }

    pub fn is_directional(self) -> bool {
        self != Self::Neutral
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongBuy => "Strong Buy",
            Self::Buy => "Buy",
            Self::Neutral => "Neutral",
            Self::Sell => "Sell",
            Self::StrongSell => "Strong Sell",
        }
    }
}

impl fmt::Display for SignalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rule cast a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteSource {
    Rsi,
    Macd,
    EmaTrend,
    Bollinger,
}

/// One rule outcome: a vote on the -2..=2 scale plus the reason it fired.
///
/// `reason` is `None` for an explicit neutral vote (RSI mid-range, price
/// exactly on the medium EMA).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub source: VoteSource,
    pub value: i8,
    pub reason: Option<String>,
}

impl Vote {
    pub fn new(source: VoteSource, value: i8, reason: impl Into<String>) -> Self {
        Self {
            source,
            value,
            reason: Some(reason.into()),
        }
    }

    pub fn neutral(source: VoteSource) -> Self {
        Self {
            source,
            value: 0,
            reason: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdSnapshot {
    pub line: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmaSnapshot {
    pub fast: Option<f64>,
    pub medium: Option<f64>,
    pub slow: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerSnapshot {
    pub upper: Option<f64>,
    pub middle: Option<f64>,
    pub lower: Option<f64>,
}

/// Last-bar indicator readings the signal was computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub macd: MacdSnapshot,
    pub ema: EmaSnapshot,
    pub bollinger: BollingerSnapshot,
}

/// Synthesized trading signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub label: SignalLabel,
    /// Integer confidence in 0..=100.
    pub confidence: u8,
    pub reasons: Vec<String>,
    pub votes: Vec<Vote>,
    /// `None` when there was not enough history to evaluate any indicator.
    pub indicators: Option<IndicatorSnapshot>,
}

impl Signal {
    /// The defined boundary result for short histories.
    pub fn insufficient_data() -> Self {
        Self {
            label: SignalLabel::Neutral,
            confidence: 0,
            reasons: vec!["Insufficient data for analysis".to_string()],
            votes: Vec::new(),
            indicators: None,
        }
    }

    pub fn top_reason(&self) -> Option<&str> {
        self.reasons.first().map(String::as_str)
    }
}

/// Context handed to the chat responder alongside a free-text query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantContext {
    pub pair: String,
    pub signal: SignalLabel,
    pub confidence: u8,
    pub indicators: Option<IndicatorSnapshot>,
}

impl AssistantContext {
    pub fn from_signal(pair: impl Into<String>, signal: &Signal) -> Self {
        Self {
            pair: pair.into(),
            signal: signal.label,
            confidence: signal.confidence,
            indicators: signal.indicators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_serializes_with_display_names() {
        let json = serde_json::to_string(&SignalLabel::StrongBuy).unwrap();
        assert_eq!(json, "\"Strong Buy\"");
        let back: SignalLabel = serde_json::from_str("\"Strong Sell\"").unwrap();
        assert_eq!(back, SignalLabel::StrongSell);
    }

    #[test]
    fn label_direction_helpers() {
        assert!(SignalLabel::Buy.is_bullish());
        assert!(SignalLabel::StrongSell.is_bearish());
        assert!(!SignalLabel::Neutral.is_directional());
    }

    #[test]
    fn insufficient_data_is_neutral_zero() {
        let signal = Signal::insufficient_data();
        assert_eq!(signal.label, SignalLabel::Neutral);
        assert_eq!(signal.confidence, 0);
        assert_eq!(signal.top_reason(), Some("Insufficient data for analysis"));
    }

    #[test]
    fn assistant_context_copies_snapshot() {
        let signal = Signal {
            label: SignalLabel::Buy,
            confidence: 72,
            reasons: vec!["MACD above signal line (bullish momentum)".into()],
            votes: vec![Vote::new(VoteSource::Macd, 1, "MACD above signal line")],
            indicators: Some(IndicatorSnapshot {
                rsi: Some(38.2),
                ..Default::default()
            }),
        };
        let ctx = AssistantContext::from_signal("EUR/USD", &signal);
        assert_eq!(ctx.pair, "EUR/USD");
        assert_eq!(ctx.signal, SignalLabel::Buy);
        assert_eq!(ctx.indicators.and_then(|s| s.rsi), Some(38.2));
    }
}
