//! Serializable analysis configuration.
//!
//! Every section is defaulted, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! [indicators.rsi]
//! period = 10
//!
//! [setup]
//! stop_atr_multiplier = 2.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::notify::NotificationSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("parse config TOML: {0}")]
    Parse(String),

    #[error("serialize config: {0}")]
    Serialize(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration for one analysis session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub indicators: IndicatorConfig,
    pub signal: SignalConfig,
    pub setup: SetupConfig,
    pub simulator: SimulatorConfig,
    pub notifications: NotificationSettings,
}

impl AnalysisConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        let periods = [
            ("indicators.rsi.period", ind.rsi.period),
            ("indicators.macd.fast", ind.macd.fast),
            ("indicators.macd.slow", ind.macd.slow),
            ("indicators.macd.signal", ind.macd.signal),
            ("indicators.trend.fast", ind.trend.fast),
            ("indicators.trend.medium", ind.trend.medium),
            ("indicators.trend.slow", ind.trend.slow),
            ("indicators.bollinger.period", ind.bollinger.period),
            ("indicators.atr_period", ind.atr_period),
            ("indicators.levels.lookback", ind.levels.lookback),
        ];
        for (key, value) in periods {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{key} must be >= 1")));
            }
        }
        if ind.ema_periods.contains(&0) {
            return Err(ConfigError::Invalid("indicators.ema_periods must be >= 1".into()));
        }
        if ind.macd.fast >= ind.macd.slow {
            return Err(ConfigError::Invalid(format!(
                "indicators.macd.fast ({}) must be below slow ({})",
                ind.macd.fast, ind.macd.slow
            )));
        }
        if ind.rsi.oversold >= ind.rsi.overbought {
            return Err(ConfigError::Invalid(format!(
                "indicators.rsi.oversold ({}) must be below overbought ({})",
                ind.rsi.oversold, ind.rsi.overbought
            )));
        }
        if self.signal.min_bars == 0 || self.setup.min_bars == 0 {
            return Err(ConfigError::Invalid(
                "signal.min_bars and setup.min_bars must be >= 1".into(),
            ));
        }
        if self.signal.rsi_buy_zone > self.signal.rsi_sell_zone {
            return Err(ConfigError::Invalid(
                "signal.rsi_buy_zone must not exceed signal.rsi_sell_zone".into(),
            ));
        }
        if self.setup.stop_atr_multiplier <= 0.0 || self.setup.target_atr_multiplier <= 0.0 {
            return Err(ConfigError::Invalid("setup ATR multipliers must be positive".into()));
        }
        if self.setup.min_probability > self.setup.max_probability {
            return Err(ConfigError::Invalid("setup probability clamp is inverted".into()));
        }
        if self.simulator.min_probability > self.simulator.max_probability {
            return Err(ConfigError::Invalid("simulator probability clamp is inverted".into()));
        }
        if self.simulator.history_capacity == 0 {
            return Err(ConfigError::Invalid("simulator.history_capacity must be >= 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiConfig {
    pub period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self {
            period: 14,
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdConfig {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

/// The EMA triple the trend-alignment rule reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub fast: usize,
    pub medium: usize,
    pub slow: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            fast: 9,
            medium: 21,
            slow: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerConfig {
    pub period: usize,
    pub std_dev: f64,
}

impl Default for BollingerConfig {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub lookback: usize,
    /// Relative distance under which same-kind candidates merge.
    pub tolerance: f64,
    pub max_levels: usize,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            tolerance: 0.001,
            max_levels: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi: RsiConfig,
    pub macd: MacdConfig,
    /// Chart overlay EMAs.
    pub ema_periods: Vec<usize>,
    pub trend: TrendConfig,
    pub bollinger: BollingerConfig,
    pub atr_period: usize,
    pub levels: LevelConfig,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi: RsiConfig::default(),
            macd: MacdConfig::default(),
            ema_periods: vec![9, 21, 50, 200],
            trend: TrendConfig::default(),
            bollinger: BollingerConfig::default(),
            atr_period: 14,
            levels: LevelConfig::default(),
        }
    }
}

impl IndicatorConfig {
    /// Overlay periods plus the trend triple, sorted and deduplicated.
    pub fn ema_periods(&self) -> Vec<usize> {
        let mut periods = self.ema_periods.clone();
        periods.extend([self.trend.fast, self.trend.medium, self.trend.slow]);
        periods.sort_unstable();
        periods.dedup();
        periods
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Bars required before any vote is cast.
    pub min_bars: usize,
    /// RSI below this (but above oversold) votes +1.
    pub rsi_buy_zone: f64,
    /// RSI above this (but below overbought) votes -1.
    pub rsi_sell_zone: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_bars: 50,
            rsi_buy_zone: 40.0,
            rsi_sell_zone: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    pub min_bars: usize,
    pub stop_atr_multiplier: f64,
    pub target_atr_multiplier: f64,
    pub min_probability: u8,
    pub max_probability: u8,
    /// How many support/resistance clusters are annotated.
    pub max_cluster_levels: usize,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            min_bars: 50,
            stop_atr_multiplier: 1.5,
            target_atr_multiplier: 2.0,
            min_probability: 50,
            max_probability: 75,
            max_cluster_levels: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub history_capacity: usize,
    pub animation_steps: usize,
    /// ATR fallback as a fraction of entry price.
    pub fallback_atr_fraction: f64,
    pub min_probability: u8,
    pub max_probability: u8,
    /// Half-width of the uniform probability jitter.
    pub jitter: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            animation_steps: 20,
            fallback_atr_fraction: 0.001,
            min_probability: 50,
            max_probability: 70,
            jitter: 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AnalysisConfig::from_toml(
            r#"
            [indicators.rsi]
            period = 10

            [setup]
            stop_atr_multiplier = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(config.indicators.rsi.period, 10);
        assert_eq!(config.indicators.rsi.overbought, 70.0);
        assert_eq!(config.indicators.macd.slow, 26);
        assert_eq!(config.setup.stop_atr_multiplier, 2.0);
        assert_eq!(config.setup.target_atr_multiplier, 2.0);
        assert_eq!(config.simulator.history_capacity, 50);
    }

    #[test]
    fn toml_roundtrip() {
        let config = AnalysisConfig::default();
        let text = config.to_toml().unwrap();
        let back = AnalysisConfig::from_toml(&text).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn rejects_inverted_macd() {
        let err = AnalysisConfig::from_toml("[indicators.macd]\nfast = 30\nslow = 26\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_period() {
        let err = AnalysisConfig::from_toml("[indicators]\natr_period = 0\n").unwrap_err();
        assert!(err.to_string().contains("atr_period"));
    }

    #[test]
    fn rejects_zero_min_bars() {
        let err = AnalysisConfig::from_toml("[signal]\nmin_bars = 0\n").unwrap_err();
        assert!(err.to_string().contains("signal.min_bars"));
        let err = AnalysisConfig::from_toml("[setup]\nmin_bars = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_garbage() {
        let err = AnalysisConfig::from_toml("indicators = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn ema_periods_include_trend_triple() {
        let config = IndicatorConfig {
            ema_periods: vec![200],
            ..Default::default()
        };
        assert_eq!(config.ema_periods(), vec![9, 21, 50, 200]);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = AnalysisConfig::from_file(Path::new("/nonexistent/pipscope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
