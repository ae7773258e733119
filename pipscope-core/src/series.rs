//! Sliding-window primitives over close prices.
//!
//! Every output is index-aligned with its input: `series[i]` belongs to
//! `bars[i]`, and entries are `None` until enough history exists to seed the
//! window. Short inputs produce an all-`None` series of the same length rather
//! than an error.

use crate::domain::Bar;

/// Index-aligned indicator output; `None` means "insufficient history here".
pub type Series = Vec<Option<f64>>;

/// Arithmetic mean of `close` over the trailing `period` bars.
pub fn moving_average(bars: &[Bar], period: usize) -> Series {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    sma_of_values(&closes, period)
}

/// EMA over `close`, seeded with the SMA of the first `period` closes.
pub fn exponential_average(bars: &[Bar], period: usize) -> Series {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    ema_of_values(&closes, period)
}

/// Population standard deviation of `close` over the window ending at `index`.
///
/// Returns `None` when the window does not fit inside `bars`.
pub fn standard_deviation(bars: &[Bar], index: usize, period: usize, mean: f64) -> Option<f64> {
    if period == 0 || index >= bars.len() || index + 1 < period {
        return None;
    }
    let start = index + 1 - period;
    let sum_sq: f64 = bars[start..=index]
        .iter()
        .map(|b| {
            let diff = b.close - mean;
            diff * diff
        })
        .sum();
    Some((sum_sq / period as f64).sqrt())
}

/// Rolling mean of an arbitrary value slice.
pub fn sma_of_values(values: &[f64], period: usize) -> Series {
    let n = values.len();
    let mut result = vec![None; n];
    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        result[i] = Some(window.iter().sum::<f64>() / period as f64);
    }
    result
}

/// EMA of an arbitrary value slice.
///
/// Seed: SMA of the first `period` values placed at `period - 1`, then
/// `ema[i] = (v[i] - ema[i-1]) * k + ema[i-1]` with `k = 2 / (period + 1)`.
/// Used directly by MACD for the signal line over the MACD subsequence.
pub fn ema_of_values(values: &[f64], period: usize) -> Series {
    let n = values.len();
    let mut result = vec![None; n];
    if period == 0 || n < period {
        return result;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = Some(seed);

    let mut prev = seed;
    for i in period..n {
        let ema = (values[i] - prev) * k + prev;
        result[i] = Some(ema);
        prev = ema;
    }
    result
}

/// Value at `index`, flattening out-of-range and absent entries.
pub fn value_at(series: &[Option<f64>], index: usize) -> Option<f64> {
    series.get(index).copied().flatten()
}

/// Most recent defined value.
pub fn last_defined(series: &[Option<f64>]) -> Option<f64> {
    series.iter().rev().find_map(|v| *v)
}

/// Value at the last index (absent if the series is empty or unseeded there).
pub fn last(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}
