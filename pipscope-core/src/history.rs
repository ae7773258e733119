//! Simulated trade history.
//!
//! Trades are stored as one JSON array under a fixed key, most recent first
//! and capped. Statistics are derived on read. A value that fails to parse is
//! treated as an empty history and overwritten by the next record.
//!
//! A separate counter numbers simulations. It keeps growing after the list is
//! truncated or cleared, so every simulation draws a fresh random stream.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::SimulatedTrade;
use crate::store::{KeyValueStore, StoreError};

pub const HISTORY_KEY: &str = "simulated_trades";
pub const SEQUENCE_KEY: &str = "simulation_sequence";
pub const DEFAULT_CAPACITY: usize = 50;

/// JSON list under `key`; missing or malformed reads as empty.
pub(crate) fn load_list<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Vec<T>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(&raw) {
        Ok(items) => Ok(items),
        Err(e) => {
            warn!(key, error = %e, "discarding malformed stored list");
            Ok(Vec::new())
        }
    }
}

/// Put `newest` (already newest first) ahead of the stored list and keep at
/// most `capacity` entries.
pub(crate) fn prepend_capped<T: Serialize + DeserializeOwned + Clone>(
    store: &impl KeyValueStore,
    key: &str,
    newest: &[T],
    capacity: usize,
) -> Result<(), StoreError> {
    let mut items = newest.to_vec();
    items.extend(load_list::<T>(store, key)?);
    items.truncate(capacity);
    let json = serde_json::to_string(&items).map_err(|e| StoreError::Serialize {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, &json)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakKind {
    Win,
    Loss,
}

/// Summary over the stored trades.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStats {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Whole percent.
    pub win_rate: u32,
    /// Rounded to 0.1 pip.
    pub total_pips: f64,
    /// Length of the run of equal outcomes starting at the newest trade.
    pub streak: usize,
    pub streak_kind: Option<StreakKind>,
}

impl SimulationStats {
    /// `trades` must be most recent first.
    pub fn from_trades(trades: &[SimulatedTrade]) -> Self {
        let Some(newest) = trades.first() else {
            return Self::default();
        };
        let wins = trades.iter().filter(|t| t.is_win).count();
        let total_pips: f64 = trades.iter().map(|t| t.pnl_pips).sum();
        let streak = trades
            .iter()
            .take_while(|t| t.is_win == newest.is_win)
            .count();

        Self {
            total_trades: trades.len(),
            wins,
            losses: trades.len() - wins,
            win_rate: (wins as f64 / trades.len() as f64 * 100.0).round() as u32,
            total_pips: (total_pips * 10.0).round() / 10.0,
            streak,
            streak_kind: Some(if newest.is_win {
                StreakKind::Win
            } else {
                StreakKind::Loss
            }),
        }
    }
}

pub struct TradeHistory<S> {
    store: S,
    capacity: usize,
}

impl<S: KeyValueStore> TradeHistory<S> {
    pub fn new(store: S) -> Self {
        Self::with_capacity(store, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(store: S, capacity: usize) -> Self {
        Self { store, capacity }
    }

    /// Stored trades, most recent first.
    pub fn load(&self) -> Result<Vec<SimulatedTrade>, StoreError> {
        load_list(&self.store, HISTORY_KEY)
    }

    /// Prepend `trade` and trim to capacity.
    pub fn record(&self, trade: &SimulatedTrade) -> Result<(), StoreError> {
        prepend_capped(&self.store, HISTORY_KEY, std::slice::from_ref(trade), self.capacity)
    }

    /// Claim the next simulation number, starting at 0.
    ///
    /// A missing or unreadable counter restarts from the stored trade count.
    pub fn next_sequence(&self) -> Result<u64, StoreError> {
        let stored = match self.store.get(SEQUENCE_KEY)? {
            Some(raw) => {
                let parsed = raw.trim().parse::<u64>();
                if let Err(e) = &parsed {
                    warn!(error = %e, "resetting malformed simulation counter");
                }
                parsed.ok()
            }
            None => None,
        };
        let current = match stored {
            Some(n) => n,
            None => self.load()?.len() as u64,
        };
        self.store.set(SEQUENCE_KEY, &(current + 1).to_string())?;
        Ok(current)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(HISTORY_KEY)
    }

    pub fn stats(&self) -> Result<SimulationStats, StoreError> {
        Ok(SimulationStats::from_trades(&self.load()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn trade(id: usize, is_win: bool, pnl_pips: f64) -> SimulatedTrade {
        SimulatedTrade {
            id: format!("t{id}"),
            pair: "EUR/USD".into(),
            direction: Direction::Long,
            entry_price: 1.0850,
            exit_price: 1.0850 + pnl_pips * 0.0001,
            stop_loss: 1.0835,
            take_profit: 1.0870,
            probability: 60,
            is_win,
            pnl_pips,
            timestamp: Utc.timestamp_opt(1_700_000_000 + id as i64, 0).unwrap(),
            price_movement: vec![1.0850, 1.0860],
        }
    }

    #[test]
    fn empty_history_has_zero_stats() {
        let history = TradeHistory::new(MemoryStore::new());
        assert!(history.load().unwrap().is_empty());
        assert_eq!(history.stats().unwrap(), SimulationStats::default());
    }

    #[test]
    fn record_prepends_and_caps() {
        let history = TradeHistory::with_capacity(MemoryStore::new(), 3);
        for i in 0..5 {
            history.record(&trade(i, true, 20.0)).unwrap();
        }
        let ids: Vec<String> = history.load().unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["t4", "t3", "t2"]);
    }

    #[test]
    fn price_path_is_dropped_on_save() {
        let history = TradeHistory::new(MemoryStore::new());
        history.record(&trade(1, true, 20.0)).unwrap();
        assert!(history.load().unwrap()[0].price_movement.is_empty());
    }

    #[test]
    fn stats_count_streak_from_newest() {
        let history = TradeHistory::new(MemoryStore::new());
        // recorded oldest first: W, L, W, W
        history.record(&trade(0, true, 20.0)).unwrap();
        history.record(&trade(1, false, -15.0)).unwrap();
        history.record(&trade(2, true, 20.0)).unwrap();
        history.record(&trade(3, true, 20.3)).unwrap();
        let stats = history.stats().unwrap();
        assert_eq!(stats.total_trades, 4);
        assert_eq!(stats.wins, 3);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.win_rate, 75);
        assert_eq!(stats.total_pips, 45.3);
        assert_eq!(stats.streak, 2);
        assert_eq!(stats.streak_kind, Some(StreakKind::Win));
    }

    #[test]
    fn malformed_history_reads_as_empty() {
        let store = MemoryStore::new();
        store.set(HISTORY_KEY, "{not json").unwrap();
        let history = TradeHistory::new(&store);
        assert!(history.load().unwrap().is_empty());
        history.record(&trade(1, false, -15.0)).unwrap();
        assert_eq!(history.load().unwrap().len(), 1);
    }

    #[test]
    fn sequence_keeps_growing_past_capacity_and_clear() {
        let history = TradeHistory::with_capacity(MemoryStore::new(), 2);
        let mut seen = Vec::new();
        for i in 0..5 {
            seen.push(history.next_sequence().unwrap());
            history.record(&trade(i, true, 20.0)).unwrap();
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(history.load().unwrap().len(), 2);

        history.clear().unwrap();
        assert_eq!(history.next_sequence().unwrap(), 5);
    }

    #[test]
    fn malformed_sequence_restarts_from_history_length() {
        let store = MemoryStore::new();
        let history = TradeHistory::new(&store);
        history.record(&trade(0, true, 20.0)).unwrap();
        history.record(&trade(1, false, -15.0)).unwrap();
        store.set(SEQUENCE_KEY, "many").unwrap();
        assert_eq!(history.next_sequence().unwrap(), 2);
        assert_eq!(history.next_sequence().unwrap(), 3);
    }

    #[test]
    fn clear_removes_everything() {
        let history = TradeHistory::new(MemoryStore::new());
        history.record(&trade(1, true, 20.0)).unwrap();
        history.clear().unwrap();
        assert!(history.load().unwrap().is_empty());
    }
}
