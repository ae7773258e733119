//! Domain types for pipscope

pub mod bar;
pub mod setup;
pub mod signal;
pub mod trade;

pub use bar::Bar;
pub use setup::{ActiveSetup, Direction, LevelKind, SetupLevel, TradeQuality, TradeSetup};
pub use signal::{
    AssistantContext, BollingerSnapshot, EmaSnapshot, IndicatorSnapshot, MacdSnapshot, Signal,
    SignalLabel, Vote, VoteSource,
};
pub use trade::SimulatedTrade;
