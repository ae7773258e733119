//! Concrete indicator implementations.
//!
//! Single-series indicators (SMA, EMA, RSI, ATR) implement the `Indicator`
//! trait. MACD and Bollinger Bands produce several aligned series at once and
//! expose their own `compute`. Support/resistance produces price clusters, not a
//! series.
//!
//! `IndicatorSet` precomputes everything the signal synthesizer, the setup
//! generator and the chart need in one pass over the bars.

pub mod atr;
pub mod bollinger;
pub mod levels;
pub mod macd;
pub mod moving_average;
pub mod rsi;

pub use atr::{true_range, Atr};
pub use bollinger::{Bollinger, BollingerSeries};
pub use levels::{support_resistance, PriceLevel};
pub use macd::{Macd, MacdSeries};
pub use moving_average::{Ema, Sma};
pub use rsi::Rsi;

use std::collections::BTreeMap;

use crate::config::IndicatorConfig;
use crate::domain::Bar;
use crate::series::Series;

/// Trait for single-series indicators.
///
/// `compute` returns a series with exactly one entry per bar. Entries before
/// `lookback()` are `None`; a series fed fewer bars than its window is
/// entirely `None`.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_21", "rsi_14").
    fn name(&self) -> &str;

    /// Index of the first bar that can carry a value.
    fn lookback(&self) -> usize;

    fn compute(&self, bars: &[Bar]) -> Series;
}

/// All indicators for one bar snapshot.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSet {
    pub rsi: Series,
    pub macd: MacdSeries,
    pub ema: BTreeMap<usize, Series>,
    pub bollinger: BollingerSeries,
    pub atr: Series,
    pub levels: Vec<PriceLevel>,
}

impl IndicatorSet {
    /// Compute every configured indicator over `bars`.
    pub fn compute(bars: &[Bar], config: &IndicatorConfig) -> Self {
        let ema = config
            .ema_periods()
            .into_iter()
            .map(|period| (period, Ema::new(period).compute(bars)))
            .collect();

        Self {
            rsi: Rsi::new(config.rsi.period).compute(bars),
            macd: Macd::new(config.macd.fast, config.macd.slow, config.macd.signal).compute(bars),
            ema,
            bollinger: Bollinger::new(config.bollinger.period, config.bollinger.std_dev)
                .compute(bars),
            atr: Atr::new(config.atr_period).compute(bars),
            levels: support_resistance(
                bars,
                config.levels.lookback,
                config.levels.tolerance,
                config.levels.max_levels,
            ),
        }
    }

    /// EMA series for `period`, if it was computed.
    pub fn ema(&self, period: usize) -> Option<&[Option<f64>]> {
        self.ema.get(&period).map(|s| s.as_slice())
    }

    /// Length shared by every series in the set.
    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev close (or close for the first bar), high/low extend the body by
/// 0.1%, bars one hour apart.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                time: 1_700_000_000 + i as i64 * 3600,
                open,
                high: open.max(close) * 1.001,
                low: open.min(close) * 0.999,
                close,
            }
        })
        .collect()
}

/// Create bars from explicit (open, high, low, close) tuples.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            time: 1_700_000_000 + i as i64 * 3600,
            open,
            high,
            low,
            close,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
