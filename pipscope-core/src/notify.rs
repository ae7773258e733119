//! Signal alerts.
//!
//! `alert_for` decides whether a signal deserves an alert under the user's
//! settings; a `NotificationSink` decides how to deliver it.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{Signal, SignalLabel};
use crate::store::{KeyValueStore, StoreError};

pub const SETTINGS_KEY: &str = "notification_settings";

const FALLBACK_BODY: &str = "Check the app for details";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub min_confidence: u8,
    /// Labels that may raise an alert.
    pub signal_types: Vec<SignalLabel>,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            min_confidence: 70,
            signal_types: vec![
                SignalLabel::StrongBuy,
                SignalLabel::StrongSell,
                SignalLabel::Buy,
                SignalLabel::Sell,
            ],
            sound_enabled: true,
            vibration_enabled: true,
        }
    }
}

impl NotificationSettings {
    /// Stored settings, or defaults when absent or unreadable.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StoreError> {
        Self::load_or(store, &Self::default())
    }

    /// Stored settings, or `fallback` (usually the configured
    /// `[notifications]` table) when absent or unreadable.
    pub fn load_or(store: &dyn KeyValueStore, fallback: &Self) -> Result<Self, StoreError> {
        let Some(raw) = store.get(SETTINGS_KEY)? else {
            return Ok(fallback.clone());
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "malformed notification settings, using configured values");
            fallback.clone()
        }))
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        let json = serde_json::to_string(self).map_err(|e| StoreError::Serialize {
            key: SETTINGS_KEY.to_string(),
            message: e.to_string(),
        })?;
        store.set(SETTINGS_KEY, &json)
    }

    pub fn allows(&self, label: SignalLabel, confidence: u8) -> bool {
        confidence >= self.min_confidence && self.signal_types.contains(&label)
    }
}

/// Payload handed to a notification sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalAlert {
    pub pair: String,
    pub label: SignalLabel,
    pub confidence: u8,
    pub top_reason: Option<String>,
}

impl SignalAlert {
    pub fn title(&self) -> String {
        format!("{} Signal - {}", self.label, self.pair)
    }

    pub fn body(&self) -> String {
        format!(
            "Confidence: {}%\n{}",
            self.confidence,
            self.top_reason.as_deref().unwrap_or(FALLBACK_BODY)
        )
    }
}

/// Build an alert if `signal` passes the confidence floor and its label is enabled.
pub fn alert_for(pair: &str, signal: &Signal, settings: &NotificationSettings) -> Option<SignalAlert> {
    if !settings.allows(signal.label, signal.confidence) {
        return None;
    }
    Some(SignalAlert {
        pair: pair.to_string(),
        label: signal.label,
        confidence: signal.confidence,
        top_reason: signal.top_reason().map(str::to_string),
    })
}

pub trait NotificationSink: Send + Sync {
    /// Deliver `alert`. Returns false if the sink declined or failed.
    fn notify(&self, alert: &SignalAlert, settings: &NotificationSettings) -> bool;
}

/// Emits alerts as structured log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, alert: &SignalAlert, settings: &NotificationSettings) -> bool {
        info!(
            pair = %alert.pair,
            label = %alert.label,
            confidence = alert.confidence,
            sound = settings.sound_enabled,
            "{}",
            alert.title()
        );
        true
    }
}
