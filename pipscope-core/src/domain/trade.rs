//! SimulatedTrade: a practice trade whose outcome is fixed at creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::setup::Direction;

/// A simulated trade record.
///
/// The outcome (`is_win`, `exit_price`, `pnl_pips`) is decided before any price
/// path is shown. `price_movement` is presentation data only and is never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedTrade {
    pub id: String,
    pub pair: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub probability: u8,
    pub is_win: bool,
    pub pnl_pips: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    pub price_movement: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_trade() -> SimulatedTrade {
        SimulatedTrade {
            id: "a1b2c3".into(),
            pair: "EUR/USD".into(),
            direction: Direction::Long,
            entry_price: 1.0850,
            exit_price: 1.0870,
            stop_loss: 1.0835,
            take_profit: 1.0870,
            probability: 62,
            is_win: true,
            pnl_pips: 20.0,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap(),
            price_movement: vec![1.0850, 1.0861, 1.0870],
        }
    }

    #[test]
    fn price_movement_is_not_persisted() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        assert!(!json.contains("priceMovement"));
        let back: SimulatedTrade = serde_json::from_str(&json).unwrap();
        assert!(back.price_movement.is_empty());
        assert_eq!(back.exit_price, trade.exit_price);
        assert_eq!(back.direction, Direction::Long);
    }
}
