//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses population stddev (divide by N).
//! Lookback: period - 1.

use crate::domain::Bar;
use crate::series::{moving_average, standard_deviation, Series};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerSeries {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64) -> Self {
        Self { period, multiplier }
    }

    pub fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    pub fn compute(&self, bars: &[Bar]) -> BollingerSeries {
        let middle = moving_average(bars, self.period);
        let mut upper = vec![None; bars.len()];
        let mut lower = vec![None; bars.len()];

        for (i, mean) in middle.iter().enumerate() {
            let Some(mean) = *mean else { continue };
            if let Some(sd) = standard_deviation(bars, i, self.period, mean) {
                upper[i] = Some(mean + self.multiplier * sd);
                lower[i] = Some(mean - self.multiplier * sd);
            }
        }

        BollingerSeries {
            upper,
            middle,
            lower,
        }
    }
}
