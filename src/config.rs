//! Administrator-supplied window properties.
//!
//! The JSON shape follows the web part property bag: camelCase keys, and
//! date fields that are either a bare string or a picker object carrying
//! `value` and `displayValue`.

use crate::constants::DEFAULT_TICK_PERIOD_MS;
use crate::error::AppError;
use crate::models::{Configuration, Interval, Timestamp};
use crate::validation::validate_tick_period_ms;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use log::warn;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// A date field as the property pane stores it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DateField {
    Text(String),
    #[serde(rename_all = "camelCase")]
    Picker {
        #[serde(default)]
        value: Option<String>,
        #[serde(default)]
        display_value: Option<String>,
    },
    /// Anything else, such as epoch milliseconds. Never parsed.
    Other(serde_json::Value),
}

impl DateField {
    /// Parsed instant. Blank, unparseable or non-text values count as unset.
    pub fn to_timestamp(&self, field: &str) -> Option<Timestamp> {
        let raw = match self {
            DateField::Text(text) => text.as_str(),
            DateField::Picker { value, .. } => value.as_deref()?,
            DateField::Other(value) => {
                warn!("Ignoring non-text {field} {value}; treating it as unset");
                return None;
            }
        }
        .trim();
        if raw.is_empty() {
            return None;
        }
        let parsed = parse_timestamp(raw);
        if parsed.is_none() {
            warn!("Ignoring unparseable {field} '{raw}'; treating it as unset");
        }
        parsed
    }
}

/// RFC 3339, or a bare `YYYY-MM-DDTHH:MM[:SS]` read as UTC.
fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn default_tick_period_ms() -> u64 {
    DEFAULT_TICK_PERIOD_MS
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowProperties {
    /// Notification toggle.
    #[serde(default)]
    pub toggle: bool,
    #[serde(default)]
    pub start_date: Option<DateField>,
    #[serde(default)]
    pub end_date: Option<DateField>,
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,
}

impl Default for WindowProperties {
    fn default() -> Self {
        Self {
            toggle: false,
            start_date: None,
            end_date: None,
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
        }
    }
}

impl WindowProperties {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn interval(&self) -> Interval {
        Interval::new(
            self.start_date.as_ref().and_then(|d| d.to_timestamp("startDate")),
            self.end_date.as_ref().and_then(|d| d.to_timestamp("endDate")),
        )
    }

    pub fn to_configuration(&self) -> Configuration {
        Configuration::new(self.interval(), self.toggle)
    }

    pub fn tick_period(&self) -> Result<Duration, AppError> {
        validate_tick_period_ms(self.tick_period_ms)
    }
}
