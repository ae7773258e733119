//! Trade simulator.
//!
//! The outcome of a practice trade is a single Bernoulli draw made when the
//! trade is created. The price path returned alongside it is presentation data:
//! an eased walk from entry to the already-decided exit price.
//!
//! Every random choice goes through an injected `Rng`, so a seeded generator
//! reproduces the trade exactly.

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::info;

use crate::config::{AnalysisConfig, SimulatorConfig};
use crate::domain::{Direction, SimulatedTrade, Signal};
use crate::market::pip_size;

/// Base win probability when no signal accompanies the trade.
pub const DEFAULT_BASE_PROBABILITY: f64 = 55.0;

/// Base win probability by signal-confidence bracket.
pub fn base_probability(signal: Option<&Signal>) -> f64 {
    match signal.map(|s| s.confidence) {
        None => DEFAULT_BASE_PROBABILITY,
        Some(80..=u8::MAX) => 68.0,
        Some(70..=79) => 65.0,
        Some(60..=69) => 60.0,
        Some(50..=59) => 55.0,
        Some(_) => 52.0,
    }
}

/// Base probability plus uniform jitter, clamped and rounded.
pub fn win_probability<R: Rng + ?Sized>(
    signal: Option<&Signal>,
    config: &SimulatorConfig,
    rng: &mut R,
) -> u8 {
    let jitter = (rng.gen::<f64>() - 0.5) * 2.0 * config.jitter;
    let probability = (base_probability(signal) + jitter).clamp(
        f64::from(config.min_probability),
        f64::from(config.max_probability),
    );
    probability.round() as u8
}

/// One Bernoulli draw: a uniform roll in `[0, 100)` below `probability` wins.
pub fn determine_outcome<R: Rng + ?Sized>(probability: u8, rng: &mut R) -> bool {
    rng.gen::<f64>() * 100.0 < f64::from(probability)
}

/// Stop and target for a simulated trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
    pub stop_distance: f64,
    pub target_distance: f64,
}

/// ATR-scaled exits. A missing or non-positive ATR falls back to a fraction of
/// the entry price.
pub fn exit_levels(entry: f64, direction: Direction, atr: Option<f64>, config: &AnalysisConfig) -> ExitLevels {
    let atr = atr
        .filter(|a| *a > 0.0)
        .unwrap_or(entry * config.simulator.fallback_atr_fraction);
    let stop_distance = atr * config.setup.stop_atr_multiplier;
    let target_distance = atr * config.setup.target_atr_multiplier;
    let sign = direction.sign();
    ExitLevels {
        stop_loss: entry - sign * stop_distance,
        take_profit: entry + sign * target_distance,
        stop_distance,
        target_distance,
    }
}

/// Eased path from `entry` to `target` with `steps + 1` points.
///
/// The first point is `entry` and the last is exactly `target`. Intermediate
/// points follow a quadratic ease-in-out with noise of up to 15% of one step.
/// `steps == 0` is treated as a single step.
pub fn generate_price_movement<R: Rng + ?Sized>(
    entry: f64,
    target: f64,
    steps: usize,
    rng: &mut R,
) -> Vec<f64> {
    let steps = steps.max(1);
    let total_move = target - entry;
    let step_size = total_move / steps as f64;

    let mut prices = Vec::with_capacity(steps + 1);
    prices.push(entry);
    for i in 1..=steps {
        let noise = (rng.gen::<f64>() - 0.5) * step_size.abs() * 0.3;
        prices.push(entry + total_move * ease_in_out(i as f64 / steps as f64) + noise);
    }
    if let Some(last) = prices.last_mut() {
        *last = target;
    }
    prices
}

fn ease_in_out(progress: f64) -> f64 {
    if progress < 0.5 {
        2.0 * progress * progress
    } else {
        1.0 - (-2.0 * progress + 2.0).powi(2) / 2.0
    }
}

/// Everything the simulator needs to open a trade.
#[derive(Debug, Clone, Copy)]
pub struct TradeRequest<'a> {
    pub pair: &'a str,
    pub direction: Direction,
    pub price: f64,
    pub signal: Option<&'a Signal>,
    /// Latest ATR, if the caller has one.
    pub atr: Option<f64>,
}

/// Open and resolve a simulated trade.
///
/// Order of random draws: jitter, outcome, id salt, path noise.
pub fn start_trade<R: Rng + ?Sized>(
    request: TradeRequest<'_>,
    config: &AnalysisConfig,
    timestamp: DateTime<Utc>,
    rng: &mut R,
) -> SimulatedTrade {
    let probability = win_probability(request.signal, &config.simulator, rng);
    let is_win = determine_outcome(probability, rng);
    let levels = exit_levels(request.price, request.direction, request.atr, config);

    let (exit_price, distance) = if is_win {
        (levels.take_profit, levels.target_distance)
    } else {
        (levels.stop_loss, -levels.stop_distance)
    };
    let pnl_pips = (distance / pip_size(request.pair) * 10.0).round() / 10.0;

    let id = trade_id(&request, timestamp, rng.gen());
    let price_movement =
        generate_price_movement(request.price, exit_price, config.simulator.animation_steps, rng);

    info!(
        pair = request.pair,
        direction = %request.direction,
        probability,
        is_win,
        pnl_pips,
        "simulated trade"
    );

    SimulatedTrade {
        id,
        pair: request.pair.to_string(),
        direction: request.direction,
        entry_price: request.price,
        exit_price,
        stop_loss: levels.stop_loss,
        take_profit: levels.take_profit,
        probability,
        is_win,
        pnl_pips,
        timestamp,
        price_movement,
    }
}

/// Short content hash identifying a trade.
fn trade_id(request: &TradeRequest<'_>, timestamp: DateTime<Utc>, salt: u64) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(request.pair.as_bytes());
    hasher.update(request.direction.to_string().as_bytes());
    hasher.update(&request.price.to_le_bytes());
    hasher.update(&timestamp.timestamp_micros().to_le_bytes());
    hasher.update(&salt.to_le_bytes());
    hasher.finalize().to_hex()[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SignalLabel;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn signal(confidence: u8) -> Signal {
        Signal {
            label: SignalLabel::Buy,
            confidence,
            reasons: Vec::new(),
            votes: Vec::new(),
            indicators: None,
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap()
    }

    #[test]
    fn base_probability_brackets() {
        assert_eq!(base_probability(None), 55.0);
        assert_eq!(base_probability(Some(&signal(0))), 52.0);
        assert_eq!(base_probability(Some(&signal(49))), 52.0);
        assert_eq!(base_probability(Some(&signal(50))), 55.0);
        assert_eq!(base_probability(Some(&signal(60))), 60.0);
        assert_eq!(base_probability(Some(&signal(75))), 65.0);
        assert_eq!(base_probability(Some(&signal(95))), 68.0);
    }

    #[test]
    fn win_probability_is_clamped() {
        let config = SimulatorConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        for confidence in [0, 50, 65, 75, 100] {
            for _ in 0..200 {
                let p = win_probability(Some(&signal(confidence)), &config, &mut rng);
                assert!((50..=70).contains(&p), "probability {p}");
            }
        }
    }

    #[test]
    fn jitter_stays_within_three_points() {
        let config = SimulatorConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let p = win_probability(Some(&signal(60)), &config, &mut rng);
            assert!((57..=63).contains(&p), "probability {p}");
        }
    }

    #[test]
    fn outcome_extremes() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert!(!determine_outcome(0, &mut rng));
            assert!(determine_outcome(100, &mut rng));
        }
    }

    #[test]
    fn outcome_is_reproducible() {
        let draws = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..32).map(|_| determine_outcome(60, &mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(draws(42), draws(42));
    }

    #[test]
    fn price_movement_ends_on_target() {
        let mut rng = StdRng::seed_from_u64(5);
        for steps in [1, 2, 7, 20] {
            let path = generate_price_movement(1.0850, 1.0880, steps, &mut rng);
            assert_eq!(path.len(), steps + 1);
            assert_eq!(path[0], 1.0850);
            assert_eq!(*path.last().unwrap(), 1.0880);
        }
    }

    #[test]
    fn zero_steps_is_one_step() {
        let mut rng = StdRng::seed_from_u64(5);
        let path = generate_price_movement(150.0, 149.5, 0, &mut rng);
        assert_eq!(path, vec![150.0, 149.5]);
    }

    #[test]
    fn exit_levels_use_fallback_atr() {
        let config = AnalysisConfig::default();
        let levels = exit_levels(1.2000, Direction::Short, None, &config);
        // ATR = 0.0012
        assert!((levels.stop_loss - 1.2018).abs() < 1e-12);
        assert!((levels.take_profit - 1.1976).abs() < 1e-12);
    }

    #[test]
    fn trade_exit_matches_outcome() {
        let config = AnalysisConfig::default();
        let sig = signal(85);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let trade = start_trade(
                TradeRequest {
                    pair: "EUR/USD",
                    direction: Direction::Long,
                    price: 1.0850,
                    signal: Some(&sig),
                    atr: Some(0.0010),
                },
                &config,
                at(),
                &mut rng,
            );
            if trade.is_win {
                assert_eq!(trade.exit_price, trade.take_profit);
                assert_eq!(trade.pnl_pips, 20.0);
            } else {
                assert_eq!(trade.exit_price, trade.stop_loss);
                assert_eq!(trade.pnl_pips, -15.0);
            }
            assert_eq!(*trade.price_movement.last().unwrap(), trade.exit_price);
            assert_eq!(trade.price_movement.len(), 21);
        }
    }

    #[test]
    fn jpy_pips_use_two_decimal_pip() {
        let config = AnalysisConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let trade = start_trade(
            TradeRequest {
                pair: "USD/JPY",
                direction: Direction::Short,
                price: 150.00,
                signal: None,
                atr: Some(0.20),
            },
            &config,
            at(),
            &mut rng,
        );
        let expected = if trade.is_win { 40.0 } else { -30.0 };
        assert_eq!(trade.pnl_pips, expected);
    }

    #[test]
    fn same_seed_same_trade() {
        let config = AnalysisConfig::default();
        let run = || {
            let mut rng = StdRng::seed_from_u64(99);
            start_trade(
                TradeRequest {
                    pair: "GBP/USD",
                    direction: Direction::Long,
                    price: 1.2650,
                    signal: None,
                    atr: None,
                },
                &config,
                at(),
                &mut rng,
            )
        };
        assert_eq!(run(), run());
    }
}
