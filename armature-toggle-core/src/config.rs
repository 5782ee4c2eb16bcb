//! Engine configuration
//!
//! Settings shared by every strategy and validator, read from the
//! environment or assembled with builder methods.
//!
//! # Environment Variables
//!
//! - `ARMATURE_TOGGLE_TIMEZONE` - IANA timezone used when a flag names none (default `UTC`)
//! - `ARMATURE_TOGGLE_LARGE_LIST_THRESHOLD` - list size that triggers a validation warning
//!   (default `10000`)
//! - `ARMATURE_TOGGLE_LOG=1|true` - attach the tracing logger to every strategy

use crate::{Result, ToggleError};
use chrono_tz::Tz;
use std::env;

/// Default list size at which validators suggest a segment instead
pub const DEFAULT_LARGE_LIST_THRESHOLD: usize = 10_000;

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleConfig {
    /// Timezone used to interpret dates when a flag carries no `timezone`
    pub default_timezone: Tz,
    /// Whitelist/blacklist size at which validators emit a warning
    pub large_list_threshold: usize,
    /// Whether strategies receive a tracing-backed logger
    pub log_evaluations: bool,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            default_timezone: Tz::UTC,
            large_list_threshold: DEFAULT_LARGE_LIST_THRESHOLD,
            log_evaluations: false,
        }
    }
}

impl ToggleConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables, ignoring unparsable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let default_timezone = env::var("ARMATURE_TOGGLE_TIMEZONE")
            .ok()
            .and_then(|s| s.parse::<Tz>().ok())
            .unwrap_or(defaults.default_timezone);

        let large_list_threshold = env::var("ARMATURE_TOGGLE_LARGE_LIST_THRESHOLD")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(defaults.large_list_threshold);

        let log_evaluations = env::var("ARMATURE_TOGGLE_LOG")
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.log_evaluations);

        Self {
            default_timezone,
            large_list_threshold,
            log_evaluations,
        }
    }

    /// Create config from environment variables, failing on unparsable values.
    pub fn try_from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(value) = env::var("ARMATURE_TOGGLE_TIMEZONE") {
            config.default_timezone = value.parse::<Tz>().map_err(|_| {
                ToggleError::configuration(format!(
                    "ARMATURE_TOGGLE_TIMEZONE: unknown timezone '{}'",
                    value
                ))
            })?;
        }

        if let Ok(value) = env::var("ARMATURE_TOGGLE_LARGE_LIST_THRESHOLD") {
            config.large_list_threshold = value.trim().parse::<usize>().map_err(|e| {
                ToggleError::configuration(format!(
                    "ARMATURE_TOGGLE_LARGE_LIST_THRESHOLD: {}",
                    e
                ))
            })?;
        }

        if let Ok(value) = env::var("ARMATURE_TOGGLE_LOG") {
            config.log_evaluations = parse_flag(&value);
        }

        Ok(config)
    }

    /// Set the default timezone
    pub fn with_default_timezone(mut self, timezone: Tz) -> Self {
        self.default_timezone = timezone;
        self
    }

    /// Set the large list warning threshold
    pub fn with_large_list_threshold(mut self, threshold: usize) -> Self {
        self.large_list_threshold = threshold;
        self
    }

    /// Enable or disable evaluation logging
    pub fn with_log_evaluations(mut self, enabled: bool) -> Self {
        self.log_evaluations = enabled;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
