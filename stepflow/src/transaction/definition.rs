//! Declared steps.

use crate::core::StepOptions;
use crate::operations::StepOperation;

/// A step as declared: adapter key, operation and options.
///
/// Definitions are checked against the adapter registry when they are
/// added to a [`super::TransactionBuilder`].
#[derive(Debug, Clone)]
pub struct StepDefinition {
    adapter: String,
    operation: StepOperation,
    options: StepOptions,
}

impl StepDefinition {
    /// Creates a definition.
    #[must_use]
    pub fn new(adapter: impl Into<String>, name: impl Into<String>, operation: StepOperation) -> Self {
        Self {
            adapter: adapter.into(),
            operation,
            options: StepOptions::new(name),
        }
    }

    /// Sets the merge key.
    #[must_use]
    pub fn with_as(mut self, key: impl Into<String>) -> Self {
        self.options = self.options.with_as(key);
        self
    }

    /// Sets the rescue message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.options = self.options.with_message(message);
        self
    }

    /// The step name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.options.step_name
    }

    /// The adapter key.
    #[must_use]
    pub fn adapter(&self) -> &str {
        &self.adapter
    }

    /// The step operation.
    #[must_use]
    pub fn operation(&self) -> &StepOperation {
        &self.operation
    }

    /// The step options.
    #[must_use]
    pub fn options(&self) -> &StepOptions {
        &self.options
    }
}
