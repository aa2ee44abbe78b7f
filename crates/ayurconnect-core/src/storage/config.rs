//! TOML-based application configuration.
//!
//! Stores:
//! - Booking flow settings (hold duration, confirmation code, reschedule notice)
//! - Seed generation settings (days, clinic hours, slot length, clinic offset)
//! - Store settings (state key, strict transitions)
//!
//! Configuration is stored at `~/.config/ayurconnect/config.toml`.

use chrono::{Duration, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

/// Booking flow configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingConfig {
    /// How long a slot stays held while the patient confirms.
    #[serde(default = "default_lock_duration_secs")]
    pub lock_duration_secs: u64,
    /// Code accepted at confirmation.
    #[serde(default = "default_confirmation_code")]
    pub confirmation_code: String,
    /// Reschedule is allowed only when the appointment starts further out than this.
    #[serde(default = "default_reschedule_notice_hours")]
    pub reschedule_notice_hours: i64,
    /// Countdown refresh cadence for `booking watch`.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

/// Mock data generation, used on first start and after a reset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedConfig {
    #[serde(default = "default_seed_days")]
    pub days: u32,
    #[serde(default = "default_day_start_hour")]
    pub day_start_hour: u32,
    #[serde(default = "default_day_end_hour")]
    pub day_end_hour: u32,
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: i64,
    /// Chance that a given clinic hour gets a slot.
    #[serde(default = "default_fill_probability")]
    pub fill_probability: f64,
    /// Clinic wall-clock offset from UTC, in minutes.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Fixed RNG seed for reproducible schedules.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    #[serde(default = "default_state_key")]
    pub state_key: String,
    /// Reject illegal transitions instead of applying them blindly.
    #[serde(default = "default_true")]
    pub strict_transitions: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/ayurconnect/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

// Default functions
fn default_lock_duration_secs() -> u64 {
    5 * 60
}
fn default_confirmation_code() -> String {
    "123456".into()
}
fn default_reschedule_notice_hours() -> i64 {
    24
}
fn default_tick_secs() -> u64 {
    1
}
fn default_seed_days() -> u32 {
    14
}
fn default_day_start_hour() -> u32 {
    9
}
fn default_day_end_hour() -> u32 {
    17
}
fn default_slot_minutes() -> i64 {
    45
}
fn default_fill_probability() -> f64 {
    0.7
}
fn default_state_key() -> String {
    "ayurConnectState".into()
}
fn default_true() -> bool {
    true
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            lock_duration_secs: default_lock_duration_secs(),
            confirmation_code: default_confirmation_code(),
            reschedule_notice_hours: default_reschedule_notice_hours(),
            tick_secs: default_tick_secs(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            days: default_seed_days(),
            day_start_hour: default_day_start_hour(),
            day_end_hour: default_day_end_hour(),
            slot_minutes: default_slot_minutes(),
            fill_probability: default_fill_probability(),
            utc_offset_minutes: 0,
            rng_seed: None,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            state_key: default_state_key(),
            strict_transitions: true,
        }
    }
}

impl BookingConfig {
    pub fn lock_duration(&self) -> Duration {
        Duration::seconds(self.lock_duration_secs as i64)
    }

    pub fn reschedule_notice(&self) -> Duration {
        Duration::hours(self.reschedule_notice_hours)
    }

    /// Sleep between countdown refreshes. Never shorter than one second.
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.tick_secs.max(1))
    }
}

impl SeedConfig {
    /// The clinic's fixed offset; out-of-range values fall back to UTC.
    pub fn clinic_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    // Optional numbers (rng_seed) start out as null.
                    serde_json::Value::Null => match value {
                        "" | "none" | "null" => serde_json::Value::Null,
                        _ => serde_json::Value::Number(
                            value
                                .parse::<u64>()
                                .map_err(|e| invalid(e.to_string()))?
                                .into(),
                        ),
                    },
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location or return (and write) defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. The key must already exist.
    ///
    /// Changes are applied in memory only; call [`Config::save`] to persist.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}
