//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|); the first bar
//! has no previous close and uses high-low.
//! Seed: mean of the first `period` true ranges at index period - 1.
//! Then Wilder smoothing: atr = (atr * (period - 1) + tr) / period.

use super::Indicator;
use crate::domain::Bar;
use crate::series::Series;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

/// Compute the True Range series from bars.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let range = bar.high - bar.low;
            if i == 0 {
                return range;
            }
            let prev_close = bars[i - 1].close;
            range
                .max((bar.high - prev_close).abs())
                .max((bar.low - prev_close).abs())
        })
        .collect()
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        let n = bars.len();
        let mut result = vec![None; n];
        if self.period == 0 || n < self.period {
            return result;
        }

        let tr = true_range(bars);
        let period = self.period as f64;
        let mut atr = tr[..self.period].iter().sum::<f64>() / period;
        result[self.period - 1] = Some(atr);

        for i in self.period..n {
            atr = (atr * (period - 1.0) + tr[i]) / period;
            result[i] = Some(atr);
        }

        result
    }
}
