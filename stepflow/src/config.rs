//! Configuration for transactions built with [`crate::TransactionBuilder`].
//!
//! ```json
//! {
//!   "extensions": ["validation", "rescues"],
//!   "rescue": { "message": "Could not save", "notify": true },
//!   "events": { "log_events": true, "level": "debug" },
//!   "tracing": { "filter": "stepflow=debug", "json": false }
//! }
//! ```

use crate::errors::TransactionError;
use crate::observability::TracingConfig;
use crate::transaction::Extension;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::Level;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepflowConfig {
    /// Extensions loaded into every transaction built with this config.
    #[serde(default)]
    pub extensions: Vec<Extension>,
    /// Settings for the rescue interceptor.
    #[serde(default)]
    pub rescue: RescueConfig,
    /// Settings for event publication.
    #[serde(default)]
    pub events: EventsConfig,
    /// Settings for the tracing subscriber.
    #[serde(default)]
    pub tracing: TracingConfig,
}

impl StepflowConfig {
    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Config`] for malformed JSON or unknown
    /// extension names.
    pub fn from_json_str(json: &str) -> Result<Self, TransactionError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TransactionError::Config(format!("invalid configuration: {e}")))?;
        config.events.level()?;
        Ok(config)
    }

    /// Reads and parses a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Config`] if the file cannot be read or
    /// parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TransactionError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            TransactionError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&contents)
    }

    /// Adds an extension.
    #[must_use]
    pub fn with_extension(mut self, extension: Extension) -> Self {
        if !self.extensions.contains(&extension) {
            self.extensions.push(extension);
        }
        self
    }
}

fn default_notify() -> bool {
    true
}

/// Rescue interceptor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescueConfig {
    /// Default failure message for rescued errors.
    #[serde(default)]
    pub message: Option<String>,
    /// Publish `step_failed` when an error is rescued.
    #[serde(default = "default_notify")]
    pub notify: bool,
}

impl Default for RescueConfig {
    fn default() -> Self {
        Self {
            message: None,
            notify: default_notify(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Event publication settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Log step events through `tracing` instead of the global sink.
    #[serde(default)]
    pub log_events: bool,
    /// Level events are logged at.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            log_events: false,
            level: default_level(),
        }
    }
}

impl EventsConfig {
    /// Parses the configured level.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Config`] for an unknown level name.
    pub fn level(&self) -> Result<Level, TransactionError> {
        Level::from_str(&self.level)
            .map_err(|_| TransactionError::Config(format!("unknown event level '{}'", self.level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = StepflowConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StepflowConfig::default());
        assert!(config.rescue.notify);
        assert_eq!(config.events.level().unwrap(), Level::INFO);
    }

    #[test]
    fn test_full_document() {
        let config = StepflowConfig::from_json_str(
            r#"{
                "extensions": ["validation", "perform_later", "rescues"],
                "rescue": {"message": "Could not save", "notify": false},
                "events": {"log_events": true, "level": "debug"},
                "tracing": {"filter": "stepflow=trace", "json": true}
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.extensions,
            vec![Extension::Validation, Extension::PerformLater, Extension::Rescues]
        );
        assert_eq!(config.rescue.message.as_deref(), Some("Could not save"));
        assert!(!config.rescue.notify);
        assert_eq!(config.events.level().unwrap(), Level::DEBUG);
        assert!(config.tracing.json);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(StepflowConfig::from_json_str(r#"{"extensions": ["teleport"]}"#).is_err());
        assert!(StepflowConfig::from_json_str(r#"{"events": {"level": "loud"}}"#).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"extensions": ["rescues"]}}"#).unwrap();

        let config = StepflowConfig::from_file(file.path()).unwrap();
        assert_eq!(config.extensions, vec![Extension::Rescues]);

        let err = StepflowConfig::from_file("/nonexistent/stepflow.json").unwrap_err();
        assert!(matches!(err, TransactionError::Config(_)));
    }
}
