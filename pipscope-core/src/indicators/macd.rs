//! Moving Average Convergence Divergence (MACD).
//!
//! line = EMA(fast) - EMA(slow), defined once both EMAs are seeded.
//! signal = EMA(signal_period) over the defined subsequence of the line,
//! mapped back onto the original bar positions.
//! histogram = line - signal where both are defined.

use crate::domain::Bar;
use crate::series::{ema_of_values, exponential_average, Series};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub line: Series,
    pub signal: Series,
    pub histogram: Series,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self { fast, slow, signal }
    }

    /// Index of the first bar with a defined histogram.
    pub fn lookback(&self) -> usize {
        (self.fast.max(self.slow) + self.signal).saturating_sub(2)
    }

    pub fn compute(&self, bars: &[Bar]) -> MacdSeries {
        let n = bars.len();
        let fast = exponential_average(bars, self.fast);
        let slow = exponential_average(bars, self.slow);

        let line: Series = fast
            .iter()
            .zip(&slow)
            .map(|(f, s)| match (f, s) {
                (Some(f), Some(s)) => Some(f - s),
                _ => None,
            })
            .collect();

        let (positions, values): (Vec<usize>, Vec<f64>) = line
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, v)))
            .unzip();
        let smoothed = ema_of_values(&values, self.signal);

        let mut signal = vec![None; n];
        for (&pos, value) in positions.iter().zip(smoothed) {
            signal[pos] = value;
        }

        let histogram = line
            .iter()
            .zip(&signal)
            .map(|(l, s)| match (l, s) {
                (Some(l), Some(s)) => Some(l - s),
                _ => None,
            })
            .collect();

        MacdSeries {
            line,
            signal,
            histogram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};
    use crate::series::exponential_average;

    fn trend(n: usize) -> Vec<f64> {
        (0..n).map(|i| 1.0 + i as f64 * 0.001 + (i as f64 * 0.5).sin() * 0.002).collect()
    }

    #[test]
    fn macd_line_is_ema_difference() {
        let bars = make_bars(&trend(60));
        let macd = Macd::new(12, 26, 9).compute(&bars);
        let fast = exponential_average(&bars, 12);
        let slow = exponential_average(&bars, 26);

        assert!(macd.line[24].is_none());
        for i in 25..60 {
            assert_approx(
                macd.line[i].unwrap(),
                fast[i].unwrap() - slow[i].unwrap(),
                DEFAULT_EPSILON,
            );
        }
    }

    #[test]
    fn signal_seeds_after_nine_line_values() {
        let bars = make_bars(&trend(60));
        let macd = Macd::new(12, 26, 9).compute(&bars);
        // line defined from 25, signal from 25 + 8
        assert!(macd.signal[32].is_none());
        let seed: f64 = macd.line[25..=33].iter().map(|v| v.unwrap()).sum::<f64>() / 9.0;
        assert_approx(macd.signal[33].unwrap(), seed, DEFAULT_EPSILON);
        assert_approx(
            macd.histogram[33].unwrap(),
            macd.line[33].unwrap() - seed,
            DEFAULT_EPSILON,
        );
        assert_eq!(Macd::new(12, 26, 9).lookback(), 33);
    }

    #[test]
    fn short_history_is_absent_but_aligned() {
        let bars = make_bars(&trend(20));
        let macd = Macd::new(12, 26, 9).compute(&bars);
        assert_eq!(macd.line.len(), 20);
        assert_eq!(macd.signal.len(), 20);
        assert!(macd.histogram.iter().all(Option::is_none));
    }

    #[test]
    fn line_without_enough_points_has_no_signal() {
        // 30 bars: line defined at 25..30 (5 points) < signal period
        let bars = make_bars(&trend(30));
        let macd = Macd::new(12, 26, 9).compute(&bars);
        assert!(macd.line[29].is_some());
        assert!(macd.signal.iter().all(Option::is_none));
    }
}
