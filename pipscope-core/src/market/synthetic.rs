//! Synthetic demo bars.
//!
//! A random walk from the pair's reference price with a slow sinusoidal drift.
//! Used offline and as the fallback when a live source fails.

use rand::Rng;
use tracing::debug;

use super::{find_pair, is_jpy_quoted, DataError, MarketDataSource, Timeframe, DEFAULT_REFERENCE_PRICE};
use crate::domain::Bar;
use crate::rng::{stream, RngHierarchy};

/// Default number of generated bars.
pub const SYNTHETIC_BARS: usize = 101;

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    rng: RngHierarchy,
    /// Epoch seconds of the last bar.
    end_time: i64,
    bars: usize,
}

impl SyntheticSource {
    pub fn new(seed: u64, end_time: i64) -> Self {
        Self {
            rng: RngHierarchy::new(seed),
            end_time,
            bars: SYNTHETIC_BARS,
        }
    }

    pub fn with_bars(mut self, bars: usize) -> Self {
        self.bars = bars;
        self
    }

    /// Per-bar volatility: half a yen for yen pairs, 30 points otherwise.
    pub fn volatility(pair: &str) -> f64 {
        if is_jpy_quoted(pair) {
            0.5
        } else {
            0.003
        }
    }

    /// Generate bars for `pair`, deterministic for a given seed.
    pub fn generate(&self, pair: &str, timeframe: Timeframe) -> Vec<Bar> {
        let key = format!("{pair}@{timeframe}");
        let mut rng = self.rng.rng_for(stream::SYNTHETIC, &key, 0);
        let volatility = Self::volatility(pair);
        let interval = timeframe.seconds();

        let mut price = find_pair(pair).map_or(DEFAULT_REFERENCE_PRICE, |p| p.reference_price);
        let mut bars = Vec::with_capacity(self.bars);

        // `back` counts bars remaining before the end time
        for back in (0..self.bars).rev() {
            let drift = (back as f64 / 20.0).sin() * volatility;
            let noise = (rng.gen::<f64>() - 0.5) * volatility * 2.0;
            let open = price;
            let close = open + drift + noise;
            let high = open.max(close) + rng.gen::<f64>() * volatility * 0.5;
            let low = open.min(close) - rng.gen::<f64>() * volatility * 0.5;
            bars.push(Bar::new(
                self.end_time - back as i64 * interval,
                open,
                high,
                low,
                close,
            ));
            price = close;
        }

        debug!(pair, %timeframe, bars = bars.len(), "generated synthetic bars");
        bars
    }
}

impl MarketDataSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_bars(&self, pair: &str, timeframe: Timeframe) -> Result<Vec<Bar>, DataError> {
        Ok(self.generate(pair, timeframe))
    }
}
