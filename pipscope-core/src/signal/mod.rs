//! Signal synthesis: turns last-bar indicator readings into one directional
//! signal with a 0..=100 confidence score.
//!
//! Classification is single-shot: each rule in `rules` casts at most one vote,
//! and `aggregate` reduces the vote list. Fewer than `signal.min_bars` bars is
//! a defined Neutral/0 result, not an error.

pub mod aggregate;
pub mod rules;

pub use aggregate::aggregate;
pub use rules::MacdReading;

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::domain::{
    Bar, BollingerSnapshot, EmaSnapshot, IndicatorSnapshot, MacdSnapshot, Signal, Vote,
};
use crate::indicators::IndicatorSet;
use crate::series::value_at;

/// Compute indicators over `bars` and synthesize a signal at the last bar.
pub fn generate_signal(bars: &[Bar], config: &AnalysisConfig) -> Signal {
    if bars.len() < config.signal.min_bars {
        return Signal::insufficient_data();
    }
    let indicators = IndicatorSet::compute(bars, &config.indicators);
    synthesize(bars, &indicators, config)
}

/// Synthesize a signal from precomputed indicators.
///
/// `indicators` must have been computed over exactly `bars`.
pub fn synthesize(bars: &[Bar], indicators: &IndicatorSet, config: &AnalysisConfig) -> Signal {
    let Some(last) = bars.len().checked_sub(1) else {
        return Signal::insufficient_data();
    };
    if bars.len() < config.signal.min_bars {
        return Signal::insufficient_data();
    }

    let price = bars[last].close;
    let snapshot = snapshot_at(indicators, config, last);
    let prev = last.checked_sub(1);

    let macd = MacdReading::from_options(
        prev.and_then(|p| value_at(&indicators.macd.line, p)),
        prev.and_then(|p| value_at(&indicators.macd.signal, p)),
        snapshot.macd.line,
        snapshot.macd.signal,
    );

    let votes: Vec<Vote> = [
        rules::rsi_vote(snapshot.rsi, &config.indicators, &config.signal),
        rules::macd_vote(macd),
        rules::trend_vote(
            price,
            snapshot.ema.fast,
            snapshot.ema.medium,
            snapshot.ema.slow,
            config.indicators.trend.medium,
        ),
        rules::bollinger_vote(price, snapshot.bollinger.upper, snapshot.bollinger.lower),
    ]
    .into_iter()
    .flatten()
    .collect();

    let (label, confidence) = aggregate(&votes);
    let reasons = votes.iter().filter_map(|v| v.reason.clone()).collect();

    debug!(
        bars = bars.len(),
        votes = votes.len(),
        %label,
        confidence,
        "signal synthesized"
    );

    Signal {
        label,
        confidence,
        reasons,
        votes,
        indicators: Some(snapshot),
    }
}

/// Indicator readings at `index`.
pub fn snapshot_at(indicators: &IndicatorSet, config: &AnalysisConfig, index: usize) -> IndicatorSnapshot {
    let trend = &config.indicators.trend;
    let ema = |period: usize| {
        indicators
            .ema(period)
            .and_then(|series| value_at(series, index))
    };

    IndicatorSnapshot {
        rsi: value_at(&indicators.rsi, index),
        macd: MacdSnapshot {
            line: value_at(&indicators.macd.line, index),
            signal: value_at(&indicators.macd.signal, index),
            histogram: value_at(&indicators.macd.histogram, index),
        },
        ema: EmaSnapshot {
            fast: ema(trend.fast),
            medium: ema(trend.medium),
            slow: ema(trend.slow),
        },
        bollinger: BollingerSnapshot {
            upper: value_at(&indicators.bollinger.upper, index),
            middle: value_at(&indicators.bollinger.middle, index),
            lower: value_at(&indicators.bollinger.lower, index),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SignalLabel, VoteSource};
    use crate::indicators::make_bars;

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 1.1000 + i as f64 * 0.0010).collect()
    }

    fn falling(n: usize) -> Vec<f64> {
        (0..n).map(|i| 1.2000 - i as f64 * 0.0010).collect()
    }

    #[test]
    fn short_history_is_neutral_zero() {
        let bars = make_bars(&rising(10));
        let signal = generate_signal(&bars, &AnalysisConfig::default());
        assert_eq!(signal.label, SignalLabel::Neutral);
        assert_eq!(signal.confidence, 0);
        assert!(signal.indicators.is_none());
        assert_eq!(signal.reasons, vec!["Insufficient data for analysis".to_string()]);
    }

    #[test]
    fn steady_uptrend_votes_overbought_and_bullish_stack() {
        let bars = make_bars(&rising(80));
        let signal = generate_signal(&bars, &AnalysisConfig::default());

        let rsi = signal.votes.iter().find(|v| v.source == VoteSource::Rsi).unwrap();
        assert_eq!(rsi.value, -2);
        let trend = signal
            .votes
            .iter()
            .find(|v| v.source == VoteSource::EmaTrend)
            .unwrap();
        assert_eq!(trend.value, 2);
        assert!(signal.confidence <= 100);
    }

    #[test]
    fn steady_downtrend_stack_is_bearish() {
        let bars = make_bars(&falling(80));
        let signal = generate_signal(&bars, &AnalysisConfig::default());
        let trend = signal
            .votes
            .iter()
            .find(|v| v.source == VoteSource::EmaTrend)
            .unwrap();
        assert_eq!(trend.value, -2);
        assert_eq!(
            trend.reason.as_deref(),
            Some("Strong downtrend: Price below all EMAs in bearish alignment")
        );
    }

    #[test]
    fn reasons_follow_vote_order() {
        let bars = make_bars(&falling(80));
        let signal = generate_signal(&bars, &AnalysisConfig::default());
        let from_votes: Vec<String> = signal.votes.iter().filter_map(|v| v.reason.clone()).collect();
        assert_eq!(signal.reasons, from_votes);
    }

    #[test]
    fn empty_bars_are_neutral_even_without_minimum() {
        let mut config = AnalysisConfig::default();
        config.signal.min_bars = 0;
        let signal = synthesize(&[], &IndicatorSet::default(), &config);
        assert_eq!(signal, Signal::insufficient_data());
        assert_eq!(generate_signal(&[], &config).confidence, 0);
    }

    #[test]
    fn snapshot_reads_last_bar() {
        let bars = make_bars(&rising(60));
        let config = AnalysisConfig::default();
        let set = IndicatorSet::compute(&bars, &config.indicators);
        let signal = synthesize(&bars, &set, &config);
        let snap = signal.indicators.unwrap();
        assert_eq!(snap.rsi, set.rsi[59]);
        assert_eq!(snap.ema.medium, set.ema(21).unwrap()[59]);
        assert_eq!(snap.bollinger.middle, set.bollinger.middle[59]);
    }
}
