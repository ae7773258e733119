//! End-to-end scenarios: bars in, signal and setup out.

use pipscope_core::config::AnalysisConfig;
use pipscope_core::domain::{Bar, LevelKind, SignalLabel, VoteSource};
use pipscope_core::indicators::{support_resistance, Indicator, IndicatorSet, Rsi};
use pipscope_core::setup::generate_trade_setup;
use pipscope_core::signal::{generate_signal, synthesize};

// ── Helpers ──────────────────────────────────────────────────────────

fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar::new(
                1_700_000_000 + i as i64 * 3600,
                open,
                open.max(close) * 1.0005,
                open.min(close) * 0.9995,
                close,
            )
        })
        .collect()
}

/// 59 bars of accelerating decline, then a 40-pip bounce on the last bar.
fn oversold_bounce() -> Vec<Bar> {
    let mut closes: Vec<f64> = (0..59)
        .map(|i| {
            let i = i as f64;
            1.2000 - 0.001 * i - 0.000005 * i * i
        })
        .collect();
    let last = closes[58];
    closes.push(last + 0.004);
    bars_from_closes(&closes)
}

// ── Insufficient data ────────────────────────────────────────────────

#[test]
fn ten_bars_is_neutral_and_inactive() {
    let config = AnalysisConfig::default();
    let closes: Vec<f64> = (0..10).map(|i| 1.10 + i as f64 * 0.001).collect();
    let bars = bars_from_closes(&closes);

    let signal = generate_signal(&bars, &config);
    assert_eq!(signal.label, SignalLabel::Neutral);
    assert_eq!(signal.confidence, 0);

    let set = IndicatorSet::compute(&bars, &config.indicators);
    let setup = generate_trade_setup(&bars, &set, &signal, &config);
    assert!(!setup.is_active());
}

// ── RSI reference series ─────────────────────────────────────────────

#[test]
fn rsi_matches_textbook_reference() {
    let closes = [
        44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
        45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
    ];
    let rsi = Rsi::new(14).compute(&bars_from_closes(&closes));
    assert!(rsi[..14].iter().all(Option::is_none));
    let first = rsi[14].expect("first RSI value");
    assert!((first - 70.46).abs() < 0.1, "first RSI {first}");
}

#[test]
fn rsi_documented_series_is_exact() {
    // 44, 44.25, 44.5, 43.75, 44.65, 45.12, 45.5 continued with the textbook tail
    let closes = [
        44.0, 44.25, 44.5, 43.75, 44.65, 45.12, 45.5, 45.42, 45.84, 46.08, 45.89, 46.03, 45.61,
        46.28, 46.28, 46.00,
    ];
    let rsi = Rsi::new(14).compute(&bars_from_closes(&closes));
    assert_eq!(rsi.len(), closes.len());
    assert!(rsi[..14].iter().all(Option::is_none));

    // gains 3.72, losses 1.44 over the first 14 deltas: RS = 31/12
    let first = rsi[14].expect("first RSI value");
    assert!((first - (100.0 - 1200.0 / 43.0)).abs() < 1e-9, "first RSI {first}");

    // Wilder step with a 0.28 loss
    let second = rsi[15].expect("second RSI value");
    assert!((second - 68.112_676_056).abs() < 1e-6, "second RSI {second}");
}

// ── Oversold cluster ─────────────────────────────────────────────────

#[test]
fn oversold_bounce_with_macd_cross_is_bullish() {
    let config = AnalysisConfig::default();
    let bars = oversold_bounce();
    assert_eq!(bars.len(), 60);

    let set = IndicatorSet::compute(&bars, &config.indicators);
    let rsi = set.rsi[59].expect("rsi");
    assert!(rsi < 25.0, "rsi {rsi}");
    assert!(set.rsi[40..].iter().all(|v| v.is_some_and(|r| r < 25.0)));

    let hist = &set.macd.histogram;
    assert!(hist[58].expect("prev histogram") < 0.0);
    assert!(hist[59].expect("last histogram") > 0.0);

    let signal = synthesize(&bars, &set, &config);
    assert!(
        matches!(signal.label, SignalLabel::Buy | SignalLabel::StrongBuy),
        "label {:?}",
        signal.label
    );
    assert!(signal.confidence > 50, "confidence {}", signal.confidence);
    assert!(signal
        .reasons
        .iter()
        .any(|r| r == "MACD bullish crossover detected"));
    let macd_vote = signal
        .votes
        .iter()
        .find(|v| v.source == VoteSource::Macd)
        .expect("macd vote");
    assert_eq!(macd_vote.value, 2);

    let setup = generate_trade_setup(&bars, &set, &signal, &config);
    let active = setup.active().expect("bullish signal yields a setup");
    assert!(active.stop_loss < active.entry && active.entry < active.take_profit);
    assert!((50..=75).contains(&active.probability));
}

#[test]
fn histogram_sign_change_matches_crossover_reason() {
    let config = AnalysisConfig::default();
    let bars = oversold_bounce();

    // every prefix with a defined previous histogram
    for end in 50..=bars.len() {
        let prefix = &bars[..end];
        let prefix_set = IndicatorSet::compute(prefix, &config.indicators);
        let (Some(prev), Some(last)) = (
            prefix_set.macd.histogram[end - 2],
            prefix_set.macd.histogram[end - 1],
        ) else {
            continue;
        };
        let crossed = (prev < 0.0) != (last < 0.0) && prev != 0.0 && last != 0.0;
        let signal = synthesize(prefix, &prefix_set, &config);
        let has_reason = signal.reasons.iter().any(|r| r.contains("crossover"));
        assert_eq!(crossed, has_reason, "bar {}", end - 1);
    }
}

// ── Support / resistance ─────────────────────────────────────────────

#[test]
fn nearby_highs_merge_into_one_resistance() {
    let highs = [
        1.0950, 1.0970, 1.1000, 1.0960, 1.0940, 1.0965, 1.1005, 1.0970, 1.0950,
    ];
    let bars: Vec<Bar> = highs
        .iter()
        .enumerate()
        .map(|(i, &h)| Bar::new(i as i64 * 3600, h - 0.001, h, h - 0.002, h - 0.001))
        .collect();

    let levels = support_resistance(&bars, 2, 0.001, 6);
    let resistance: Vec<_> = levels
        .iter()
        .filter(|l| l.kind == LevelKind::Resistance)
        .collect();
    assert_eq!(resistance.len(), 1);
    assert_eq!(resistance[0].strength, 2);
    assert!((resistance[0].price - 1.10025).abs() < 1e-12);
}
