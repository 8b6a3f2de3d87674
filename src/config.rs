//! Configuration file for execution tunables
//!
//! JSON object; every field is optional and falls back to its default.
//! Loading reads, parses, then validates. Invalid values are rejected, never
//! clamped.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cursor::{CursorKnobs, DEFAULT_CURSOR_TIMEOUT_MILLIS, DEFAULT_MONITOR_FREQUENCY_SECS};
use crate::failpoint::WaitSettings;
use crate::observability::{log_event_with_fields, Event, Severity};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecConfig {
    /// Cursor inactivity timeout; non-positive times cursors out at once
    #[serde(default = "default_cursor_timeout_millis")]
    pub cursor_timeout_millis: i64,

    /// Seconds between reaper passes
    #[serde(default = "default_monitor_frequency_secs")]
    pub client_cursor_monitor_frequency_secs: u64,

    #[serde(default = "default_poll_interval_millis")]
    pub fail_point_poll_interval_millis: u64,

    /// Minimum log severity: TRACE, INFO, WARN, ERROR or FATAL
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_cursor_timeout_millis() -> i64 {
    DEFAULT_CURSOR_TIMEOUT_MILLIS
}
fn default_monitor_frequency_secs() -> u64 {
    DEFAULT_MONITOR_FREQUENCY_SECS
}
fn default_poll_interval_millis() -> u64 {
    10
}
fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            cursor_timeout_millis: default_cursor_timeout_millis(),
            client_cursor_monitor_frequency_secs: default_monitor_frequency_secs(),
            fail_point_poll_interval_millis: default_poll_interval_millis(),
            log_level: default_log_level(),
        }
    }
}

impl ExecConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_json(&content).map_err(|e| {
            log_event_with_fields(Event::ConfigRejected, &[("reason", &e.to_string())]);
            e
        })?;

        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("path", &path.display().to_string()),
                ("cursor_timeout_millis", &config.cursor_timeout_millis.to_string()),
                (
                    "monitor_frequency_secs",
                    &config.client_cursor_monitor_frequency_secs.to_string(),
                ),
            ],
        );
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: ExecConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.client_cursor_monitor_frequency_secs == 0 {
            return Err(ConfigError::Invalid(
                "client_cursor_monitor_frequency_secs must be > 0".into(),
            ));
        }
        if self.fail_point_poll_interval_millis == 0 {
            return Err(ConfigError::Invalid(
                "fail_point_poll_interval_millis must be > 0".into(),
            ));
        }
        self.min_severity()?;
        Ok(())
    }

    pub fn min_severity(&self) -> ConfigResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "Invalid log_level: '{}'. Must be one of TRACE, INFO, WARN, ERROR, FATAL.",
                self.log_level
            ))
        })
    }

    /// Runtime-tunable reaper settings seeded from this config
    pub fn cursor_knobs(&self) -> Arc<CursorKnobs> {
        Arc::new(CursorKnobs::new(
            self.cursor_timeout_millis,
            self.client_cursor_monitor_frequency_secs,
        ))
    }

    pub fn wait_settings(&self) -> WaitSettings {
        WaitSettings {
            poll_interval: Duration::from_millis(self.fail_point_poll_interval_millis),
            metrics: None,
        }
    }
}
