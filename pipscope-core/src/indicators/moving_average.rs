//! Simple and exponential moving averages over `close`.
//!
//! SMA lookback: period - 1.
//! EMA seed: SMA of the first `period` closes at index period - 1, then
//! EMA[t] = (close[t] - EMA[t-1]) * k + EMA[t-1], k = 2 / (period + 1).

use super::Indicator;
use crate::domain::Bar;
use crate::series::{exponential_average, moving_average, Series};

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        moving_average(bars, self.period)
    }
}

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Series {
        exponential_average(bars, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_close() {
        let bars = make_bars(&[100.0, 200.0, 300.0]);
        let result = Ema::new(1).compute(&bars);
        assert_approx(result[0].unwrap(), 100.0, DEFAULT_EPSILON);
        assert_approx(result[1].unwrap(), 200.0, DEFAULT_EPSILON);
        assert_approx(result[2].unwrap(), 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_seed_is_exact_mean() {
        let closes = [1.0841, 1.0852, 1.0849, 1.0861, 1.0870, 1.0866, 1.0874];
        let bars = make_bars(&closes);
        let result = Ema::new(5).compute(&bars);
        let mean = closes[..5].iter().sum::<f64>() / 5.0;
        assert_eq!(result[4], Some(mean));
        assert!(result[3].is_none());
    }

    #[test]
    fn sma_tracks_window() {
        let bars = make_bars(&[2.0, 4.0, 6.0, 8.0]);
        let result = Sma::new(2).compute(&bars);
        assert!(result[0].is_none());
        assert_approx(result[1].unwrap(), 3.0, DEFAULT_EPSILON);
        assert_approx(result[3].unwrap(), 7.0, DEFAULT_EPSILON);
    }

    #[test]
    fn lookbacks_and_names() {
        assert_eq!(Ema::new(21).lookback(), 20);
        assert_eq!(Sma::new(20).name(), "sma_20");
        assert_eq!(Ema::new(9).name(), "ema_9");
    }
}
