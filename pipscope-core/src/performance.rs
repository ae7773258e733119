//! Hindsight evaluation of signals.
//!
//! `analyze_opportunity` walks the bars after a signal until price has moved
//! a fixed number of pips for or against it. `backtest_signals` repeats that
//! for every bar of a history, and `PerformanceStats` summarizes the results.
//! `PerformanceLog` keeps the most recent evaluated trades in a store and
//! `recommendations` turns a summary into advice.

use std::collections::BTreeMap;

use chrono::{DateTime, Timelike};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::domain::{Bar, Direction, SignalLabel};
use crate::history::{load_list, prepend_capped};
use crate::market::pip_size;
use crate::signal::generate_signal;
use crate::store::{KeyValueStore, StoreError};

pub const DEFAULT_PIPS_TARGET: f64 = 20.0;
pub const PERFORMANCE_KEY: &str = "signal_performance";
pub const DEFAULT_LOG_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Profit,
    Loss,
    /// Neither threshold was reached before the bars ran out.
    Open,
    /// The signal had no direction.
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub outcome: Outcome,
    /// Pips at exit, or at the last bar for an open trade.
    pub pips: f64,
    pub max_favorable_pips: f64,
    pub max_adverse_pips: f64,
    /// 1-based offset of the exit bar into the walked bars.
    pub exit_index: Option<usize>,
    /// Bars held: the exit offset, or every walked bar when still open.
    pub duration: usize,
}

impl Opportunity {
    fn neutral() -> Self {
        Self {
            outcome: Outcome::Neutral,
            pips: 0.0,
            max_favorable_pips: 0.0,
            max_adverse_pips: 0.0,
            exit_index: None,
            duration: 0,
        }
    }
}

fn round_tenth(pips: f64) -> f64 {
    (pips * 10.0).round() / 10.0
}

/// Walk `subsequent` closes from `entry` until the move reaches `pips_target`
/// in either direction. Returns `None` when there is nothing to walk.
pub fn analyze_opportunity(
    label: SignalLabel,
    pair: &str,
    entry: f64,
    subsequent: &[Bar],
    pips_target: f64,
) -> Option<Opportunity> {
    if subsequent.is_empty() {
        return None;
    }
    let Some(direction) = Direction::from_label(label) else {
        return Some(Opportunity::neutral());
    };

    let pip = pip_size(pair);
    let mut favorable = 0.0_f64;
    let mut adverse = 0.0_f64;
    let mut pips = 0.0;

    for (i, bar) in subsequent.iter().enumerate() {
        pips = (bar.close - entry) / pip * direction.sign();
        favorable = favorable.max(pips);
        adverse = adverse.min(pips);

        let outcome = if pips >= pips_target {
            Outcome::Profit
        } else if pips <= -pips_target {
            Outcome::Loss
        } else {
            continue;
        };
        return Some(Opportunity {
            outcome,
            pips: round_tenth(pips),
            max_favorable_pips: round_tenth(favorable),
            max_adverse_pips: round_tenth(adverse),
            exit_index: Some(i + 1),
            duration: i + 1,
        });
    }

    Some(Opportunity {
        outcome: Outcome::Open,
        pips: round_tenth(pips),
        max_favorable_pips: round_tenth(favorable),
        max_adverse_pips: round_tenth(adverse),
        exit_index: None,
        duration: subsequent.len(),
    })
}

/// One evaluated historical signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalTrade {
    pub pair: String,
    /// Bar index the signal fired on.
    pub index: usize,
    /// Epoch seconds of that bar.
    pub time: i64,
    pub label: SignalLabel,
    pub confidence: u8,
    pub entry: f64,
    pub result: Opportunity,
}

/// Synthesize a signal at every bar with enough history and evaluate each
/// qualifying directional signal against the bars that follow it.
///
/// Signals are evaluated independently, so their trades may overlap. Results
/// are ordered by bar index.
pub fn backtest_signals(
    pair: &str,
    bars: &[Bar],
    config: &AnalysisConfig,
    min_confidence: u8,
    pips_target: f64,
) -> Vec<SignalTrade> {
    let first = config.signal.min_bars.max(1) - 1;
    if bars.len() < 2 || first >= bars.len() - 1 {
        return Vec::new();
    }

    let trades: Vec<SignalTrade> = (first..bars.len() - 1)
        .into_par_iter()
        .filter_map(|index| {
            let signal = generate_signal(&bars[..=index], config);
            if !signal.label.is_directional() || signal.confidence < min_confidence {
                return None;
            }
            let entry = bars[index].close;
            let result =
                analyze_opportunity(signal.label, pair, entry, &bars[index + 1..], pips_target)?;
            Some(SignalTrade {
                pair: pair.to_string(),
                index,
                time: bars[index].time,
                label: signal.label,
                confidence: signal.confidence,
                entry,
                result,
            })
        })
        .collect();

    debug!(pair, bars = bars.len(), trades = trades.len(), "backtest complete");
    trades
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub count: usize,
    pub wins: usize,
    pub losses: usize,
    pub pips: f64,
}

impl Breakdown {
    fn add(&mut self, trade: &SignalTrade) {
        self.count += 1;
        match trade.result.outcome {
            Outcome::Profit => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Open | Outcome::Neutral => {}
        }
        self.pips += trade.result.pips;
    }

    /// Wins over decided trades, 0..=1.
    pub fn win_ratio(&self) -> f64 {
        let decided = self.wins + self.losses;
        if decided == 0 {
            0.0
        } else {
            self.wins as f64 / decided as f64
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Whole percent of decided trades.
    pub win_rate: u32,
    pub avg_pips: f64,
    pub total_pips: f64,
    pub best_trade: Option<SignalTrade>,
    pub worst_trade: Option<SignalTrade>,
    pub by_pair: BTreeMap<String, Breakdown>,
    /// Keyed by UTC hour of the signal bar.
    pub by_hour: BTreeMap<u32, Breakdown>,
    /// Hour with the best win ratio among hours with at least two decided trades.
    pub best_hour: Option<u32>,
    /// Whole-percent win rate of `best_hour`, 0 when there is none.
    pub best_hour_win_rate: u32,
}

impl PerformanceStats {
    pub fn from_trades(trades: &[SignalTrade]) -> Self {
        if trades.is_empty() {
            return Self::default();
        }

        let mut overall = Breakdown::default();
        let mut by_pair: BTreeMap<String, Breakdown> = BTreeMap::new();
        let mut by_hour: BTreeMap<u32, Breakdown> = BTreeMap::new();
        for trade in trades {
            overall.add(trade);
            by_pair.entry(trade.pair.clone()).or_default().add(trade);
            let hour = DateTime::from_timestamp(trade.time, 0).map_or(0, |t| t.hour());
            by_hour.entry(hour).or_default().add(trade);
        }

        let best = by_hour
            .iter()
            .filter(|(_, b)| b.wins + b.losses >= 2 && b.wins > 0)
            .fold(None::<(u32, f64)>, |best, (&hour, b)| match best {
                Some((_, ratio)) if ratio >= b.win_ratio() => best,
                _ => Some((hour, b.win_ratio())),
            });

        let by_pips = |a: &&SignalTrade, b: &&SignalTrade| a.result.pips.total_cmp(&b.result.pips);

        Self {
            total_trades: trades.len(),
            wins: overall.wins,
            losses: overall.losses,
            win_rate: (overall.win_ratio() * 100.0).round() as u32,
            avg_pips: round_tenth(overall.pips / trades.len() as f64),
            total_pips: round_tenth(overall.pips),
            best_trade: trades.iter().max_by(by_pips).cloned(),
            worst_trade: trades.iter().min_by(by_pips).cloned(),
            by_pair,
            by_hour,
            best_hour: best.map(|(hour, _)| hour),
            best_hour_win_rate: best.map_or(0, |(_, ratio)| (ratio * 100.0).round() as u32),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceKind {
    Timing,
    Strategy,
    Success,
    Pair,
}

/// One piece of advice derived from past performance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub kind: AdviceKind,
    pub title: String,
    pub description: String,
}

/// Advice on timing, win rate and pair focus. Empty until some trade is decided.
pub fn recommendations(stats: &PerformanceStats) -> Vec<Advice> {
    if stats.wins + stats.losses == 0 {
        return Vec::new();
    }
    let mut advice = Vec::new();

    if let Some(hour) = stats.best_hour {
        advice.push(Advice {
            kind: AdviceKind::Timing,
            title: "Best Trading Time".to_string(),
            description: format!(
                "Your best win rate ({}%) is around {hour:02}:00 UTC. \
                 Consider focusing your analysis during this window.",
                stats.best_hour_win_rate
            ),
        });
    }

    if stats.win_rate < 50 {
        advice.push(Advice {
            kind: AdviceKind::Strategy,
            title: "Improve Win Rate".to_string(),
            description: "Your win rate is below 50%. Consider waiting for higher \
                          confidence signals (75%+) before entering trades."
                .to_string(),
        });
    } else if stats.win_rate >= 60 {
        advice.push(Advice {
            kind: AdviceKind::Success,
            title: "Good Strategy".to_string(),
            description: format!(
                "Your {}% win rate shows a solid reading of the signals. \
                 Keep refining your approach.",
                stats.win_rate
            ),
        });
    }

    // first pair in symbol order wins ties
    let best_pair = stats
        .by_pair
        .iter()
        .filter(|(_, b)| b.wins + b.losses >= 2)
        .fold(None::<(&str, f64)>, |best, (pair, b)| match best {
            Some((_, ratio)) if ratio >= b.win_ratio() => best,
            _ => Some((pair.as_str(), b.win_ratio())),
        });
    if let Some((pair, ratio)) = best_pair.filter(|&(_, ratio)| ratio > 0.5) {
        advice.push(Advice {
            kind: AdviceKind::Pair,
            title: format!("Focus on {pair}"),
            description: format!(
                "You perform best with {pair} ({}% win rate). Consider specializing in this pair.",
                (ratio * 100.0).round() as u32
            ),
        });
    }

    advice
}

/// Evaluated signal trades kept in a store, most recent first and capped.
pub struct PerformanceLog<S> {
    store: S,
    capacity: usize,
}

impl<S: KeyValueStore> PerformanceLog<S> {
    pub fn new(store: S) -> Self {
        Self::with_capacity(store, DEFAULT_LOG_CAPACITY)
    }

    pub fn with_capacity(store: S, capacity: usize) -> Self {
        Self { store, capacity }
    }

    pub fn load(&self) -> Result<Vec<SignalTrade>, StoreError> {
        load_list(&self.store, PERFORMANCE_KEY)
    }

    pub fn record(&self, trade: &SignalTrade) -> Result<(), StoreError> {
        self.record_all(std::slice::from_ref(trade))
    }

    /// Record `trades` given oldest first, as `backtest_signals` returns them.
    pub fn record_all(&self, trades: &[SignalTrade]) -> Result<(), StoreError> {
        if trades.is_empty() {
            return Ok(());
        }
        let newest_first: Vec<SignalTrade> = trades.iter().rev().cloned().collect();
        prepend_capped(&self.store, PERFORMANCE_KEY, &newest_first, self.capacity)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(PERFORMANCE_KEY)
    }

    pub fn stats(&self) -> Result<PerformanceStats, StoreError> {
        Ok(PerformanceStats::from_trades(&self.load()?))
    }
}
