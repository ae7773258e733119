//! pipscope CLI: analysis, scanning, simulation and backtesting commands.
//!
//! Commands:
//! - `analyze`: signal, trade setup and chart levels for one pair
//! - `scan`: analyze several pairs in parallel
//! - `simulate`: open a seeded practice trade and record it in the history
//! - `history stats|clear`: inspect or reset the simulated trade history
//! - `backtest`: evaluate every historical signal against the bars that follow
//! - `performance stats|clear`: saved backtest trades and advice drawn from them
//! - `sessions`: active market sessions and West-Africa trading windows
//! - `config`: print the effective configuration as TOML

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Timelike, Utc};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pipscope_core::analysis::{analyze, Analysis};
use pipscope_core::config::AnalysisConfig;
use pipscope_core::domain::{Bar, Direction, TradeSetup};
use pipscope_core::history::TradeHistory;
use pipscope_core::indicators::IndicatorSet;
use pipscope_core::market::{
    find_pair, CsvSource, FallbackSource, MarketDataSource, SyntheticSource, Timeframe, PAIRS,
};
use pipscope_core::notify::{alert_for, LogSink, NotificationSettings, NotificationSink};
use pipscope_core::performance::{
    backtest_signals, recommendations, PerformanceLog, PerformanceStats, DEFAULT_PIPS_TARGET,
};
use pipscope_core::rng::{stream, RngHierarchy};
use pipscope_core::series::last_defined;
use pipscope_core::sessions;
use pipscope_core::signal::synthesize;
use pipscope_core::simulator::{start_trade, TradeRequest};
use pipscope_core::store::FileStore;

#[derive(Parser)]
#[command(name = "pipscope", about = "pipscope: forex technical analysis and signal engine")]
struct Cli {
    /// Analysis configuration (TOML). Defaults apply to missing keys.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read bars from a CSV file (time,open,high,low,close) instead of synthetic data.
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Seed for synthetic data and simulations.
    #[arg(long, global = true, default_value_t = 42)]
    seed: u64,

    /// Bar interval, e.g. 60min, 1H, daily.
    #[arg(long, global = true, default_value = "60min")]
    timeframe: Timeframe,

    /// Directory for persisted history and settings.
    #[arg(long, global = true, default_value = ".pipscope")]
    store_dir: PathBuf,

    /// Emit JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Debug-level logging. `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Signal, trade setup and levels for one pair.
    Analyze {
        #[arg(default_value = "EUR/USD")]
        pair: String,

        /// Raise a notification if the signal passes the alert settings.
        #[arg(long, default_value_t = false)]
        notify: bool,
    },
    /// Analyze several pairs in parallel. Defaults to the full catalog.
    Scan {
        pairs: Vec<String>,
    },
    /// Open a simulated trade and record its outcome.
    Simulate {
        #[arg(default_value = "EUR/USD")]
        pair: String,

        /// LONG or SHORT. Defaults to the signal's direction, or LONG when neutral.
        #[arg(long)]
        direction: Option<String>,
    },
    /// Simulated trade history.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Evaluate every historical signal on the bars that follow it.
    Backtest {
        #[arg(default_value = "EUR/USD")]
        pair: String,

        /// Ignore signals below this confidence.
        #[arg(long, default_value_t = 60)]
        min_confidence: u8,

        /// Pips in either direction that close a trade.
        #[arg(long, default_value_t = DEFAULT_PIPS_TARGET)]
        pips: f64,

        /// Number of synthetic bars to generate.
        #[arg(long, default_value_t = 300)]
        bars: usize,

        /// Append the evaluated trades to the performance log.
        #[arg(long, default_value_t = false)]
        save: bool,
    },
    /// Saved backtest trades.
    Performance {
        #[command(subcommand)]
        action: PerformanceAction,
    },
    /// Market sessions and trading windows for an hour (UTC). Defaults to now.
    Sessions {
        #[arg(long)]
        utc_hour: Option<u32>,

        #[arg(long, default_value_t = 0)]
        minute: u32,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Win rate, pips and current streak.
    Stats,
    /// Delete every recorded trade.
    Clear,
}

#[derive(Subcommand)]
enum PerformanceAction {
    /// Summary and recommendations over the saved trades.
    Stats,
    /// Delete the saved trades.
    Clear,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Analyze { pair, notify } => run_analyze(&cli, &config, pair, *notify),
        Commands::Scan { pairs } => run_scan(&cli, &config, pairs),
        Commands::Simulate { pair, direction } => {
            run_simulate(&cli, &config, pair, direction.as_deref())
        }
        Commands::History { action } => run_history(&cli, action),
        Commands::Backtest {
            pair,
            min_confidence,
            pips,
            bars,
            save,
        } => run_backtest(&cli, &config, pair, *min_confidence, *pips, *bars, *save),
        Commands::Performance { action } => run_performance(&cli, action),
        Commands::Sessions { utc_hour, minute } => run_sessions(&cli, *utc_hour, *minute),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => Ok(AnalysisConfig::from_file(path)?),
        None => Ok(AnalysisConfig::default()),
    }
}

/// Synthetic bars ending at the start of the current interval, or the CSV
/// file with synthetic fallback.
fn source(cli: &Cli, bar_count: Option<usize>) -> Box<dyn MarketDataSource> {
    let step = cli.timeframe.seconds();
    let end = Utc::now().timestamp() / step * step;
    let mut synthetic = SyntheticSource::new(cli.seed, end);
    if let Some(n) = bar_count {
        synthetic = synthetic.with_bars(n);
    }
    match &cli.csv {
        Some(path) => Box::new(FallbackSource::new(CsvSource::new(path), synthetic)),
        None => Box::new(synthetic),
    }
}

fn fetch(cli: &Cli, pair: &str, bar_count: Option<usize>) -> Result<Vec<Bar>> {
    if find_pair(pair).is_none() {
        info!(pair, "pair is not in the catalog, using default pricing");
    }
    source(cli, bar_count)
        .fetch_bars(pair, cli.timeframe)
        .with_context(|| format!("failed to load bars for {pair}"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── analyze ──────────────────────────────────────────────────────────

fn run_analyze(cli: &Cli, config: &AnalysisConfig, pair: &str, notify: bool) -> Result<()> {
    let bars = fetch(cli, pair, None)?;
    let analysis = analyze(pair, &bars, config);

    if notify {
        let store = FileStore::new(&cli.store_dir);
        let settings = NotificationSettings::load_or(&store, &config.notifications)?;
        match alert_for(pair, &analysis.signal, &settings) {
            Some(alert) => {
                LogSink.notify(&alert, &settings);
            }
            None => info!(pair, "signal below alert threshold"),
        }
    }

    if cli.json {
        return print_json(&analysis);
    }
    print_analysis(&analysis, bars.len(), cli.timeframe);
    Ok(())
}

fn print_analysis(a: &Analysis, bar_count: usize, timeframe: Timeframe) {
    println!();
    println!("=== {} ({}) ===", a.pair, timeframe.label());
    println!("Bars:           {bar_count}");
    if let Some(price) = a.price {
        println!("Price:          {price:.5}");
    }
    println!("Signal:         {}", a.signal.label);
    println!("Confidence:     {}%", a.signal.confidence);
    for reason in &a.signal.reasons {
        println!("  - {reason}");
    }

    if let Some(snapshot) = &a.signal.indicators {
        println!();
        println!("--- Indicators ---");
        print_opt("RSI", snapshot.rsi, 1);
        print_opt("MACD", snapshot.macd.line, 6);
        print_opt("MACD Signal", snapshot.macd.signal, 6);
        print_opt("EMA fast", snapshot.ema.fast, 5);
        print_opt("EMA medium", snapshot.ema.medium, 5);
        print_opt("EMA slow", snapshot.ema.slow, 5);
        print_opt("BB Upper", snapshot.bollinger.upper, 5);
        print_opt("BB Lower", snapshot.bollinger.lower, 5);
    }

    println!();
    println!("--- Trade Setup ---");
    match &a.setup {
        TradeSetup::Active(setup) => {
            println!("Direction:      {}", setup.direction);
            println!("Entry:          {:.5}", setup.entry);
            println!("Stop Loss:      {:.5}", setup.stop_loss);
            println!("Take Profit:    {:.5}", setup.take_profit);
            println!("Risk/Reward:    1:{:.2}", setup.risk_reward);
            println!(
                "Probability:    {}% (grade {})",
                setup.probability,
                setup.quality().label()
            );
            for level in &setup.levels {
                let strength = level.strength.map(|s| format!(" x{s}")).unwrap_or_default();
                println!("  {:<10} {:.5}{strength}", level.label, level.price);
            }
        }
        TradeSetup::Inactive {
            message,
            suggestion,
        } => {
            println!("{message}");
            println!("{suggestion}");
        }
    }
}

fn print_opt(name: &str, value: Option<f64>, decimals: usize) {
    match value {
        Some(v) => println!("{:<15} {v:.decimals$}", format!("{name}:")),
        None => println!("{:<15} n/a", format!("{name}:")),
    }
}

// ── scan ─────────────────────────────────────────────────────────────

fn run_scan(cli: &Cli, config: &AnalysisConfig, pairs: &[String]) -> Result<()> {
    let pairs: Vec<String> = if pairs.is_empty() {
        PAIRS.iter().map(|p| p.symbol.to_string()).collect()
    } else {
        pairs.to_vec()
    };

    let results: Vec<Analysis> = pairs
        .par_iter()
        .map(|pair| fetch(cli, pair, None).map(|bars| analyze(pair, &bars, config)))
        .collect::<Result<_>>()?;

    // a pair listed twice keeps its last result
    let latest: BTreeMap<&str, &Analysis> =
        results.iter().map(|a| (a.pair.as_str(), a)).collect();

    if cli.json {
        return print_json(&latest);
    }
    println!("{:<9} {:<12} {:>5} {:>6}  {}", "Pair", "Signal", "Conf", "Prob", "Setup");
    println!("{}", "-".repeat(48));
    for (pair, a) in &latest {
        let (prob, setup) = match a.setup.active() {
            Some(s) => (format!("{}%", s.probability), s.direction.to_string()),
            None => ("-".to_string(), "none".to_string()),
        };
        println!(
            "{:<9} {:<12} {:>4}% {:>6}  {}",
            pair,
            a.signal.label.as_str(),
            a.signal.confidence,
            prob,
            setup
        );
    }
    Ok(())
}

// ── simulate / history ───────────────────────────────────────────────

fn parse_direction(s: &str) -> Result<Direction> {
    match s.to_ascii_uppercase().as_str() {
        "LONG" | "BUY" => Ok(Direction::Long),
        "SHORT" | "SELL" => Ok(Direction::Short),
        other => bail!("unknown direction '{other}'. Valid: LONG, SHORT"),
    }
}

fn run_simulate(
    cli: &Cli,
    config: &AnalysisConfig,
    pair: &str,
    direction: Option<&str>,
) -> Result<()> {
    let bars = fetch(cli, pair, None)?;
    let Some(last) = bars.last() else {
        bail!("no bars for {pair}");
    };
    let indicators = IndicatorSet::compute(&bars, &config.indicators);
    let signal = synthesize(&bars, &indicators, config);
    let direction = match direction {
        Some(d) => parse_direction(d)?,
        None => Direction::from_label(signal.label).unwrap_or(Direction::Long),
    };

    let history = TradeHistory::with_capacity(
        FileStore::new(&cli.store_dir),
        config.simulator.history_capacity,
    );
    let iteration = history.next_sequence()?;
    let mut rng = RngHierarchy::new(cli.seed).rng_for(stream::SIMULATION, pair, iteration);

    let trade = start_trade(
        TradeRequest {
            pair,
            direction,
            price: last.close,
            signal: Some(&signal),
            atr: last_defined(&indicators.atr),
        },
        config,
        Utc::now(),
        &mut rng,
    );
    history.record(&trade)?;

    if cli.json {
        return print_json(&trade);
    }
    println!();
    println!("=== Simulated {} {} ===", trade.direction, trade.pair);
    println!("Win probability: {}%", trade.probability);
    println!("Entry:           {:.5}", trade.entry_price);
    println!("Stop Loss:       {:.5}", trade.stop_loss);
    println!("Take Profit:     {:.5}", trade.take_profit);
    let path: Vec<String> = trade.price_movement.iter().map(|p| format!("{p:.5}")).collect();
    println!("Path:            {}", path.join(" "));
    println!(
        "Result:          {} at {:.5} ({:+.1} pips)",
        if trade.is_win { "WIN" } else { "LOSS" },
        trade.exit_price,
        trade.pnl_pips
    );
    Ok(())
}

fn run_history(cli: &Cli, action: &HistoryAction) -> Result<()> {
    let store = FileStore::new(&cli.store_dir);
    let history = TradeHistory::new(&store);
    match action {
        HistoryAction::Stats => {
            let stats = history.stats()?;
            if cli.json {
                return print_json(&stats);
            }
            println!("Trades:         {}", stats.total_trades);
            println!("Wins / Losses:  {} / {}", stats.wins, stats.losses);
            println!("Win Rate:       {}%", stats.win_rate);
            println!("Total Pips:     {:+.1}", stats.total_pips);
            if let Some(kind) = stats.streak_kind {
                println!("Streak:         {} {:?}", stats.streak, kind);
            }
        }
        HistoryAction::Clear => {
            history.clear()?;
            println!("History cleared: {}", store.dir().display());
        }
    }
    Ok(())
}

// ── backtest ─────────────────────────────────────────────────────────

fn run_backtest(
    cli: &Cli,
    config: &AnalysisConfig,
    pair: &str,
    min_confidence: u8,
    pips: f64,
    bar_count: usize,
    save: bool,
) -> Result<()> {
    if pips <= 0.0 {
        bail!("--pips must be positive");
    }
    let bars = fetch(cli, pair, Some(bar_count))?;
    let trades = backtest_signals(pair, &bars, config, min_confidence, pips);
    if save {
        PerformanceLog::new(FileStore::new(&cli.store_dir)).record_all(&trades)?;
        info!(pair, trades = trades.len(), "saved backtest trades");
    }
    let stats = PerformanceStats::from_trades(&trades);

    if cli.json {
        return print_json(&stats);
    }
    println!();
    println!("=== Backtest {pair} ===");
    println!("Bars:           {}", bars.len());
    print_performance(&stats);
    Ok(())
}

fn run_performance(cli: &Cli, action: &PerformanceAction) -> Result<()> {
    let store = FileStore::new(&cli.store_dir);
    let log = PerformanceLog::new(&store);
    match action {
        PerformanceAction::Stats => {
            let stats = log.stats()?;
            if cli.json {
                return print_json(&serde_json::json!({
                    "stats": stats,
                    "recommendations": recommendations(&stats),
                }));
            }
            println!();
            println!("=== Saved Performance ===");
            print_performance(&stats);
        }
        PerformanceAction::Clear => {
            log.clear()?;
            println!("Performance log cleared: {}", store.dir().display());
        }
    }
    Ok(())
}

fn print_performance(stats: &PerformanceStats) {
    println!("Signals:        {}", stats.total_trades);
    println!("Wins / Losses:  {} / {}", stats.wins, stats.losses);
    println!("Win Rate:       {}%", stats.win_rate);
    println!("Avg Pips:       {:+.1}", stats.avg_pips);
    println!("Total Pips:     {:+.1}", stats.total_pips);
    if let Some(best) = &stats.best_trade {
        println!("Best:           {:+.1} ({} @ bar {})", best.result.pips, best.label, best.index);
    }
    if let Some(worst) = &stats.worst_trade {
        println!("Worst:          {:+.1} ({} @ bar {})", worst.result.pips, worst.label, worst.index);
    }
    if let Some(hour) = stats.best_hour {
        println!("Best Hour:      {hour:02}:00 UTC ({}% wins)", stats.best_hour_win_rate);
    }
    for advice in recommendations(stats) {
        println!();
        println!("* {}", advice.title);
        println!("  {}", advice.description);
    }
}

// ── sessions ─────────────────────────────────────────────────────────

fn run_sessions(cli: &Cli, utc_hour: Option<u32>, minute: u32) -> Result<()> {
    let now = Utc::now();
    let (utc_hour, minute) = match utc_hour {
        Some(h) if h < 24 && minute < 60 => (h, minute),
        Some(_) => bail!("hour must be 0-23 and minute 0-59"),
        None => (now.hour(), now.minute()),
    };
    let wat = sessions::wat_hour(utc_hour);
    let active = sessions::active_sessions(utc_hour);
    let window = sessions::current_window(wat);
    let recommendation = sessions::recommendation(wat);
    let countdown = sessions::time_to_next_window(wat, minute);

    if cli.json {
        return print_json(&serde_json::json!({
            "utc_hour": utc_hour,
            "wat_hour": wat,
            "active_sessions": active,
            "window": window,
            "recommendation": recommendation,
            "next_window": countdown,
        }));
    }
    println!("Time:           {utc_hour:02}:{minute:02} UTC / {wat:02}:{minute:02} WAT");
    let names: Vec<&str> = active.iter().map(|s| s.name).collect();
    println!("Sessions:       {}", if names.is_empty() { "none".to_string() } else { names.join(", ") });
    if let Some(w) = window {
        println!("Window:         {} ({}/4) - {}", w.name, w.quality, w.description);
    }
    println!("{}: {}", recommendation.title, recommendation.message);
    println!("Suggestion:     {}", recommendation.suggested_action);
    println!(
        "Next window:    {} in {}h {:02}m",
        countdown.target_label(),
        countdown.hours,
        countdown.minutes
    );
    Ok(())
}
