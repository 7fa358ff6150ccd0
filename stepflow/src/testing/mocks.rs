//! Mock operations for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::core::{StepArgs, StepResult};
use crate::errors::{PersistenceError, TransactionError};
use crate::operations::Operation;
use crate::validation::Validator;

/// Records every call and returns a configurable result.
#[derive(Debug)]
pub struct RecordingOperation {
    name: Option<String>,
    result: Mutex<Option<StepResult>>,
    calls: Mutex<Vec<StepArgs>>,
    validator: Option<Arc<dyn Validator>>,
}

impl RecordingOperation {
    /// Creates an anonymous operation returning `result`.
    #[must_use]
    pub fn new(result: StepResult) -> Self {
        Self {
            name: None,
            result: Mutex::new(Some(result)),
            calls: Mutex::new(Vec::new()),
            validator: None,
        }
    }

    /// Creates an operation that succeeds with its own input.
    #[must_use]
    pub fn echo() -> Self {
        Self {
            name: None,
            result: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            validator: None,
        }
    }

    /// Names the operation.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attaches a validator.
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Changes the result returned by later calls.
    pub fn set_result(&self, result: StepResult) {
        *self.result.lock() = Some(result);
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the arguments of every call.
    #[must_use]
    pub fn calls(&self) -> Vec<StepArgs> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Operation for RecordingOperation {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn validator(&self) -> Option<Arc<dyn Validator>> {
        self.validator.clone()
    }

    async fn call(&self, args: StepArgs) -> Result<StepResult, TransactionError> {
        self.calls.lock().push(args.clone());
        let result = self.result.lock().clone();
        Ok(result.unwrap_or_else(|| StepResult::Success(args.into_value())))
    }
}

#[derive(Debug, Clone)]
enum Raise {
    Persistence(PersistenceError),
    Message(String),
}

/// Raises an error on every call.
#[derive(Debug, Clone)]
pub struct FailingOperation {
    raise: Raise,
}

impl FailingOperation {
    /// Raises a persistence error.
    #[must_use]
    pub fn persistence(error: PersistenceError) -> Self {
        Self {
            raise: Raise::Persistence(error),
        }
    }

    /// Raises an arbitrary operation error.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            raise: Raise::Message(message.into()),
        }
    }
}

#[async_trait]
impl Operation for FailingOperation {
    async fn call(&self, _args: StepArgs) -> Result<StepResult, TransactionError> {
        Err(match &self.raise {
            Raise::Persistence(error) => TransactionError::Persistence(error.clone()),
            Raise::Message(message) => TransactionError::Operation(anyhow::anyhow!(message.clone())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_recording_operation() {
        let op = RecordingOperation::echo().named("echo");
        let result = op.call(StepArgs::single(json!({"a": 1}))).await.unwrap();

        assert_eq!(result, StepResult::success(json!({"a": 1})));
        assert_eq!(op.call_count(), 1);

        op.set_result(StepResult::failure("nope"));
        assert!(op.call(StepArgs::empty()).await.unwrap().is_failure());
        assert_eq!(op.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_failing_operation() {
        let op = FailingOperation::persistence(PersistenceError::record_not_found("User", "id", "1"));
        assert!(op.call(StepArgs::empty()).await.unwrap_err().rescuable().is_some());

        let op = FailingOperation::message("boom");
        let err = op.call(StepArgs::empty()).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
