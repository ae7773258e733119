//! Forex trading sessions and West-Africa (WAT, UTC+1) trading windows.
//!
//! Every function takes the hour explicitly; callers derive it from their own
//! clock.

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

/// WAT offset from UTC, in hours.
pub const WAT_OFFSET_HOURS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Volatility {
    Low,
    Medium,
    High,
}

/// A global session in UTC hours. `close_utc < open_utc` spans midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Session {
    pub name: &'static str,
    pub open_utc: u32,
    pub close_utc: u32,
    pub pairs: &'static [&'static str],
    pub volatility: Volatility,
}

impl Session {
    pub fn is_active(&self, utc_hour: u32) -> bool {
        in_hours(utc_hour, self.open_utc, self.close_utc)
    }
}

pub const SESSIONS: [Session; 4] = [
    Session {
        name: "Sydney (Asia Pacific)",
        open_utc: 22,
        close_utc: 7,
        pairs: &["AUD/USD", "NZD/USD", "AUD/JPY"],
        volatility: Volatility::Low,
    },
    Session {
        name: "Tokyo (Asian)",
        open_utc: 0,
        close_utc: 9,
        pairs: &["USD/JPY", "EUR/JPY", "GBP/JPY"],
        volatility: Volatility::Medium,
    },
    Session {
        name: "London (European)",
        open_utc: 8,
        close_utc: 17,
        pairs: &["EUR/USD", "GBP/USD", "EUR/GBP"],
        volatility: Volatility::High,
    },
    Session {
        name: "New York (American)",
        open_utc: 13,
        close_utc: 22,
        pairs: &["EUR/USD", "GBP/USD", "USD/CAD"],
        volatility: Volatility::High,
    },
];

/// A recommended window in WAT hours, rated 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TradingWindow {
    pub name: &'static str,
    pub start: u32,
    pub end: u32,
    pub quality: u8,
    pub description: &'static str,
    pub best_pairs: &'static [&'static str],
}

/// Checked in order; the first match wins where windows overlap.
pub const WINDOWS: [TradingWindow; 4] = [
    TradingWindow {
        name: "London Open",
        start: 9,
        end: 12,
        quality: 3,
        description: "London opens - high volatility, good trends",
        best_pairs: &["EUR/USD", "GBP/USD"],
    },
    TradingWindow {
        name: "London/NY Overlap",
        start: 14,
        end: 18,
        quality: 4,
        description: "Best liquidity & volatility of the day",
        best_pairs: &["EUR/USD", "GBP/USD", "USD/JPY"],
    },
    TradingWindow {
        name: "NY Session",
        start: 18,
        end: 23,
        quality: 3,
        description: "Strong US market moves",
        best_pairs: &["EUR/USD", "USD/CAD", "USD/JPY"],
    },
    TradingWindow {
        name: "Asian Session",
        start: 1,
        end: 10,
        quality: 2,
        description: "Lower volatility, range trading",
        best_pairs: &["USD/JPY", "AUD/USD"],
    },
];

fn in_hours(hour: u32, start: u32, end: u32) -> bool {
    if start < end {
        hour >= start && hour < end
    } else {
        hour >= start || hour < end
    }
}

pub fn wat_hour(utc_hour: u32) -> u32 {
    (utc_hour + WAT_OFFSET_HOURS) % 24
}

pub fn utc_hour(wat_hour: u32) -> u32 {
    (wat_hour + 24 - WAT_OFFSET_HOURS % 24) % 24
}

/// Current `(hour, minute)` in WAT.
pub fn wat_time(now: DateTime<Utc>) -> (u32, u32) {
    (wat_hour(now.hour()), now.minute())
}

pub fn active_sessions(utc_hour: u32) -> Vec<&'static Session> {
    SESSIONS.iter().filter(|s| s.is_active(utc_hour)).collect()
}

pub fn current_window(wat_hour: u32) -> Option<&'static TradingWindow> {
    WINDOWS.iter().find(|w| in_hours(wat_hour, w.start, w.end))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Excellent,
    Good,
    Moderate,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub status: Activity,
    pub title: String,
    pub message: String,
    pub suggested_action: String,
    pub quality: u8,
}

/// Trading advice for a WAT hour.
pub fn recommendation(wat_hour: u32) -> Recommendation {
    let rec = |status, title: &str, message: String, action: &str, quality| Recommendation {
        status,
        title: title.to_string(),
        message,
        suggested_action: action.to_string(),
        quality,
    };

    match wat_hour {
        14..=17 => rec(
            Activity::Excellent,
            "Excellent Time to Trade",
            "London/NY overlap - highest liquidity and volatility".to_string(),
            "Look for breakout trades on EUR/USD or GBP/USD",
            4,
        ),
        9..=13 | 18..=21 => {
            let names: Vec<&str> = active_sessions(utc_hour(wat_hour))
                .iter()
                .map(|s| s.name)
                .collect();
            rec(
                Activity::Good,
                "Good Time to Trade",
                format!("{} active", names.join(" & ")),
                "Watch for trend continuation patterns",
                3,
            )
        }
        1..=8 => rec(
            Activity::Moderate,
            "Asian Session",
            "Lower volatility - good for range trading".to_string(),
            "Consider USD/JPY or wait for London open",
            2,
        ),
        _ => rec(
            Activity::Low,
            "Low Activity Period",
            "Markets transitioning between sessions".to_string(),
            "Wait for London open at 09:00 WAT",
            1,
        ),
    }
}

/// Hours at which the good windows open, in WAT.
const GOOD_WINDOW_STARTS: [u32; 2] = [9, 14];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub hours: u32,
    pub minutes: u32,
    pub target_hour: u32,
    pub tomorrow: bool,
}

impl Countdown {
    pub fn target_label(&self) -> String {
        let suffix = if self.tomorrow { " (tomorrow)" } else { "" };
        format!("{:02}:00 WAT{suffix}", self.target_hour)
    }
}

/// Time from `wat_hour:minute` until the next good window opens.
pub fn time_to_next_window(wat_hour: u32, minute: u32) -> Countdown {
    let now = wat_hour * 60 + minute;
    let (target_hour, tomorrow) = GOOD_WINDOW_STARTS
        .iter()
        .find(|&&start| wat_hour < start)
        .map_or((GOOD_WINDOW_STARTS[0], true), |&start| (start, false));
    let target = target_hour * 60 + if tomorrow { 24 * 60 } else { 0 };
    let remaining = target - now;
    Countdown {
        hours: remaining / 60,
        minutes: remaining % 60,
        target_hour,
        tomorrow,
    }
}
