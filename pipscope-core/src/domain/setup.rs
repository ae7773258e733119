//! TradeSetup: a concrete entry/stop/target derived from a directional signal.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::signal::SignalLabel;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Direction implied by a signal label; `None` for Neutral.
    pub fn from_label(label: SignalLabel) -> Option<Self> {
        if label.is_bullish() {
            Some(Self::Long)
        } else if label.is_bearish() {
            Some(Self::Short)
        } else {
            None
        }
    }

    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => f.write_str("LONG"),
            Self::Short => f.write_str("SHORT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    Support,
    Resistance,
}

/// A price annotation for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupLevel {
    pub price: f64,
    pub kind: LevelKind,
    pub label: String,
    /// Cluster strength for support/resistance levels.
    pub strength: Option<u32>,
}

/// A tradeable setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSetup {
    pub direction: Direction,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// reward distance / risk distance, rounded to 2 decimals.
    pub risk_reward: f64,
    /// Bounded success heuristic.
    pub probability: u8,
    pub atr: f64,
    pub levels: Vec<SetupLevel>,
    pub reasons: Vec<String>,
}

impl ActiveSetup {
    pub fn quality(&self) -> TradeQuality {
        TradeQuality::from_probability(self.probability)
    }
}

/// Result of the trade setup generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TradeSetup {
    Active(ActiveSetup),
    Inactive { message: String, suggestion: String },
}

impl TradeSetup {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    pub fn active(&self) -> Option<&ActiveSetup> {
        match self {
            Self::Active(setup) => Some(setup),
            Self::Inactive { .. } => None,
        }
    }
}

/// Letter grade for a setup probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeQuality {
    A,
    B,
    C,
    D,
}

impl TradeQuality {
    pub fn from_probability(probability: u8) -> Self {
        match probability {
            70..=u8::MAX => Self::A,
            60..=69 => Self::B,
            55..=59 => Self::C,
            _ => Self::D,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::A => "High Quality",
            Self::B => "Good Setup",
            Self::C => "Moderate",
            Self::D => "Low Quality",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_from_label() {
        assert_eq!(Direction::from_label(SignalLabel::StrongBuy), Some(Direction::Long));
        assert_eq!(Direction::from_label(SignalLabel::Sell), Some(Direction::Short));
        assert_eq!(Direction::from_label(SignalLabel::Neutral), None);
    }

    #[test]
    fn quality_grades() {
        assert_eq!(TradeQuality::from_probability(75), TradeQuality::A);
        assert_eq!(TradeQuality::from_probability(70), TradeQuality::A);
        assert_eq!(TradeQuality::from_probability(64), TradeQuality::B);
        assert_eq!(TradeQuality::from_probability(55), TradeQuality::C);
        assert_eq!(TradeQuality::from_probability(50), TradeQuality::D);
    }

    #[test]
    fn inactive_setup_serializes_with_state_tag() {
        let setup = TradeSetup::Inactive {
            message: "No clear setup - market is ranging".into(),
            suggestion: "Wait for stronger directional signals".into(),
        };
        let json = serde_json::to_value(&setup).unwrap();
        assert_eq!(json["state"], "inactive");
        assert!(!setup.is_active());
        assert!(setup.active().is_none());
    }
}
