//! Market data: the pair catalog, timeframes, and bar sources.
//!
//! The analysis core never fetches anything itself. A `MarketDataSource` hands
//! it an ordered bar sequence; the sources here cover synthetic demo data, CSV
//! import, a TTL cache and a primary-with-fallback combinator.

pub mod cache;
pub mod csv_file;
pub mod fallback;
pub mod synthetic;

pub use cache::{CachedSource, Clock, SystemClock, DEFAULT_TTL_SECS};
pub use csv_file::CsvSource;
pub use fallback::FallbackSource;
pub use synthetic::SyntheticSource;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;

/// Errors raised by bar sources.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("malformed row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("unknown timeframe: {0}")]
    UnknownTimeframe(String),

    #[error("no bars available for {pair} ({timeframe})")]
    Empty { pair: String, timeframe: Timeframe },

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Bar interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1min")]
    M1,
    #[serde(rename = "5min")]
    M5,
    #[serde(rename = "15min")]
    M15,
    #[serde(rename = "30min")]
    M30,
    #[serde(rename = "60min")]
    #[default]
    H1,
    #[serde(rename = "240min")]
    H4,
    #[serde(rename = "daily")]
    D1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 7] = [
        Self::M1,
        Self::M5,
        Self::M15,
        Self::M30,
        Self::H1,
        Self::H4,
        Self::D1,
    ];

    pub fn minutes(self) -> i64 {
        match self {
            Self::M1 => 1,
            Self::M5 => 5,
            Self::M15 => 15,
            Self::M30 => 30,
            Self::H1 => 60,
            Self::H4 => 240,
            Self::D1 => 1440,
        }
    }

    pub fn seconds(self) -> i64 {
        self.minutes() * 60
    }

    /// Wire code, e.g. "60min" or "daily".
    pub fn code(self) -> &'static str {
        match self {
            Self::M1 => "1min",
            Self::M5 => "5min",
            Self::M15 => "15min",
            Self::M30 => "30min",
            Self::H1 => "60min",
            Self::H4 => "240min",
            Self::D1 => "daily",
        }
    }

    /// Short chart label, e.g. "1H".
    pub fn label(self) -> &'static str {
        match self {
            Self::M1 => "1M",
            Self::M5 => "5M",
            Self::M15 => "15M",
            Self::M30 => "30M",
            Self::H1 => "1H",
            Self::H4 => "4H",
            Self::D1 => "1D",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Timeframe {
    type Err = DataError;

    /// Accepts either the wire code ("60min") or the chart label ("1H").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tf| tf.code() == s || tf.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| DataError::UnknownTimeframe(s.to_string()))
    }
}

/// A tradeable currency pair from the built-in catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrencyPair {
    pub symbol: &'static str,
    pub name: &'static str,
    pub base: &'static str,
    pub quote: &'static str,
    /// Reference price for synthetic data.
    pub reference_price: f64,
}

impl CurrencyPair {
    pub fn pip_size(&self) -> f64 {
        pip_size(self.symbol)
    }
}

const fn pair(
    symbol: &'static str,
    name: &'static str,
    base: &'static str,
    quote: &'static str,
    reference_price: f64,
) -> CurrencyPair {
    CurrencyPair {
        symbol,
        name,
        base,
        quote,
        reference_price,
    }
}

pub const PAIRS: [CurrencyPair; 10] = [
    pair("EUR/USD", "Euro / US Dollar", "EUR", "USD", 1.0850),
    pair("GBP/USD", "British Pound / US Dollar", "GBP", "USD", 1.2650),
    pair("USD/JPY", "US Dollar / Japanese Yen", "USD", "JPY", 148.50),
    pair("USD/CHF", "US Dollar / Swiss Franc", "USD", "CHF", 0.8750),
    pair("AUD/USD", "Australian Dollar / US Dollar", "AUD", "USD", 0.6550),
    pair("USD/CAD", "US Dollar / Canadian Dollar", "USD", "CAD", 1.3550),
    pair("NZD/USD", "New Zealand Dollar / US Dollar", "NZD", "USD", 0.6150),
    pair("EUR/GBP", "Euro / British Pound", "EUR", "GBP", 0.8580),
    pair("EUR/JPY", "Euro / Japanese Yen", "EUR", "JPY", 161.00),
    pair("GBP/JPY", "British Pound / Japanese Yen", "GBP", "JPY", 187.70),
];

/// Reference price for pairs outside the catalog.
pub const DEFAULT_REFERENCE_PRICE: f64 = 1.0;

/// Look up a catalog pair by symbol ("EUR/USD"); case-insensitive.
pub fn find_pair(symbol: &str) -> Option<&'static CurrencyPair> {
    PAIRS.iter().find(|p| p.symbol.eq_ignore_ascii_case(symbol))
}

/// True for pairs quoted in yen.
pub fn is_jpy_quoted(symbol: &str) -> bool {
    symbol.to_ascii_uppercase().contains("JPY")
}

/// One pip: 0.01 for yen pairs, 0.0001 otherwise.
pub fn pip_size(symbol: &str) -> f64 {
    if is_jpy_quoted(symbol) {
        0.01
    } else {
        0.0001
    }
}

/// A source of ascending OHLC bars.
pub trait MarketDataSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Bars for `pair` at `timeframe`, ascending by time.
    fn fetch_bars(&self, pair: &str, timeframe: Timeframe) -> Result<Vec<Bar>, DataError>;
}

impl<S: MarketDataSource + ?Sized> MarketDataSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_bars(&self, pair: &str, timeframe: Timeframe) -> Result<Vec<Bar>, DataError> {
        (**self).fetch_bars(pair, timeframe)
    }
}
