//! pipscope core: forex technical analysis and signal engine.
//!
//! Data flows one way:
//! bars -> indicators -> signal -> trade setup -> simulated outcome.
//!
//! - Index-aligned indicator series (SMA, EMA, RSI, MACD, Bollinger, ATR) and
//!   support/resistance clustering
//! - Rule-based signal synthesis with a bounded confidence score
//! - ATR-scaled trade setups with a confluence probability
//! - Seeded trade simulation and a capped, persisted trade history
//! - Market data sources, trading sessions and hindsight backtesting

pub mod analysis;
pub mod config;
pub mod domain;
pub mod history;
pub mod indicators;
pub mod market;
pub mod notify;
pub mod performance;
pub mod rng;
pub mod series;
pub mod sessions;
pub mod setup;
pub mod signal;
pub mod simulator;
pub mod store;

pub use analysis::{analyze, Analysis};
pub use config::AnalysisConfig;
