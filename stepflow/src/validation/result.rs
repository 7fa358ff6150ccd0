//! Validation result object.

use crate::core::PipelineContext;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The outcome of running a validator.
///
/// Carries the coerced output and, on failure, the messages per key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    output: PipelineContext,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    errors: IndexMap<String, Vec<String>>,
}

impl ValidationResult {
    /// Creates a result from output and errors.
    #[must_use]
    pub fn new(output: PipelineContext, errors: IndexMap<String, Vec<String>>) -> Self {
        Self { output, errors }
    }

    /// Creates a passing result.
    #[must_use]
    pub fn passed(output: PipelineContext) -> Self {
        Self {
            output,
            errors: IndexMap::new(),
        }
    }

    /// Adds an error message for a key.
    pub fn add_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(key.into()).or_default().push(message.into());
    }

    /// Returns true when there are no errors.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true when there is at least one error.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The validated output.
    #[must_use]
    pub fn output(&self) -> &PipelineContext {
        &self.output
    }

    /// The validated output as an owned context.
    #[must_use]
    pub fn to_context(&self) -> PipelineContext {
        self.output.clone()
    }

    /// Messages per key.
    #[must_use]
    pub fn errors(&self) -> &IndexMap<String, Vec<String>> {
        &self.errors
    }

    /// Messages for a single key.
    #[must_use]
    pub fn errors_for(&self, key: &str) -> &[String] {
        self.errors.get(key).map_or(&[], Vec::as_slice)
    }

    /// Converts into a standard `Result`.
    pub fn into_result(self) -> Result<PipelineContext, Self> {
        if self.is_success() {
            Ok(self.output)
        } else {
            Err(self)
        }
    }
}
