//! Tracing subscriber setup and step timing.

use crate::errors::TransactionError;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

fn default_filter() -> String {
    "info".to_string()
}

/// Settings for the global tracing subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracingConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl TracingConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter directives.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Switches JSON output on or off.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter.
///
/// # Errors
///
/// Returns [`TransactionError::Config`] if the filter does not parse or a
/// global subscriber is already installed.
pub fn init_tracing(config: &TracingConfig) -> Result<(), TransactionError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| TransactionError::Config(format!("invalid tracing filter: {e}")))?,
    };

    let builder = fmt().with_env_filter(filter).with_target(false);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| TransactionError::Config(format!("tracing already initialized: {e}")))
}

/// Measures how long a step takes.
#[derive(Debug)]
pub struct StepTimer {
    start: Instant,
    step: String,
}

impl StepTimer {
    /// Starts timing a step.
    #[must_use]
    pub fn start(step: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            step: step.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// The step being timed.
    #[must_use]
    pub fn step(&self) -> &str {
        &self.step
    }

    /// Stops the timer and returns the duration in milliseconds.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_timer() {
        let timer = StepTimer::start("persist");
        assert_eq!(timer.step(), "persist");
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(timer.finish() >= 1.0);
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: TracingConfig = serde_json::from_str("{\"json\": true}").unwrap();
        assert_eq!(config, TracingConfig::new().with_json(true));
        assert_eq!(config.filter, "info");
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let err = init_tracing(&TracingConfig::new().with_filter("stepflow=loudest")).unwrap_err();
        assert!(matches!(err, TransactionError::Config(_)));
    }
}
