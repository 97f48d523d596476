//! Playback configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ordering::OrderingPolicy;

/// Environment variable overriding [`PlaybackConfig::item_duration_ms`].
pub const ITEM_DURATION_ENV: &str = "STORYREEL_ITEM_DURATION_MS";

/// Environment variable overriding [`PlaybackConfig::unviewed_first`].
pub const UNVIEWED_FIRST_ENV: &str = "STORYREEL_UNVIEWED_FIRST";

/// Environment variable overriding [`PlaybackConfig::hold_threshold_ms`].
pub const HOLD_THRESHOLD_ENV: &str = "STORYREEL_HOLD_THRESHOLD_MS";

/// Invalid playback configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// What was expected.
        expected: &'static str,
        /// What was found.
        value: String,
    },

    /// A duration was zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Product policy knobs for story playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// How long each item stays on screen before auto-advancing.
    pub item_duration_ms: u64,
    /// Whether entities with unviewed items outrank fresher viewed ones.
    pub unviewed_first: bool,
    /// Presses at least this long count as holds rather than taps.
    pub hold_threshold_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            item_duration_ms: 5_000,
            unviewed_first: true,
            hold_threshold_ms: 200,
        }
    }
}

impl PlaybackConfig {
    /// Reads overrides from the environment on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparsable value or
    /// a duration is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with an injectable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is unparsable or a duration is zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(ITEM_DURATION_ENV) {
            config.item_duration_ms = parse_millis(ITEM_DURATION_ENV, &value)?;
        }
        if let Some(value) = lookup(UNVIEWED_FIRST_ENV) {
            config.unviewed_first = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: UNVIEWED_FIRST_ENV,
                        expected: "a boolean",
                        value,
                    });
                }
            };
        }
        if let Some(value) = lookup(HOLD_THRESHOLD_ENV) {
            config.hold_threshold_ms = parse_millis(HOLD_THRESHOLD_ENV, &value)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero durations.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ZeroDuration` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.item_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration("item_duration_ms"));
        }
        if self.hold_threshold_ms == 0 {
            return Err(ConfigError::ZeroDuration("hold_threshold_ms"));
        }
        Ok(())
    }

    #[must_use]
    pub fn item_duration(&self) -> Duration {
        Duration::from_millis(self.item_duration_ms)
    }

    #[must_use]
    pub fn hold_threshold(&self) -> Duration {
        Duration::from_millis(self.hold_threshold_ms)
    }

    #[must_use]
    pub fn ordering_policy(&self) -> OrderingPolicy {
        OrderingPolicy {
            unviewed_first: self.unviewed_first,
        }
    }
}

fn parse_millis(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        expected: "a whole number of milliseconds",
        value: value.to_owned(),
    })
}
