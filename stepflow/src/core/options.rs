//! Options supplied to every adapter call.

use serde::{Deserialize, Serialize};

/// Immutable per-step options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOptions {
    /// The step name. Always present.
    pub step_name: String,
    /// Key to merge the step output under.
    #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_key: Option<String>,
    /// Failure message used when a raised error is rescued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StepOptions {
    /// Creates options for the named step.
    #[must_use]
    pub fn new(step_name: impl Into<String>) -> Self {
        Self {
            step_name: step_name.into(),
            as_key: None,
            message: None,
        }
    }

    /// Sets the merge key.
    #[must_use]
    pub fn with_as(mut self, key: impl Into<String>) -> Self {
        self.as_key = Some(key.into());
        self
    }

    /// Sets the rescue message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
