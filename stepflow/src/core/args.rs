//! Positional step arguments.

use super::PipelineContext;
use crate::errors::TransactionError;
use serde_json::Value;

/// The positional arguments handed to a step adapter.
///
/// The runtime passes the previous step's success value as the only
/// argument. Adapters that work on keyword arguments accept at most one
/// argument, and it must be a mapping or `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepArgs(Vec<Value>);

impl StepArgs {
    /// Creates an empty argument list.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a single-argument list.
    #[must_use]
    pub fn single(value: impl Into<Value>) -> Self {
        Self(vec![value.into()])
    }

    /// Creates an argument list from several values.
    #[must_use]
    pub fn from_values(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Returns the first argument.
    #[must_use]
    pub fn first(&self) -> Option<&Value> {
        self.0.first()
    }

    /// Returns all arguments.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Collapses the arguments into a single value.
    ///
    /// No arguments become `null`, one argument is returned as is, and
    /// several arguments become an array.
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut values = self.0;
        match values.len() {
            0 => Value::Null,
            1 => values.remove(0),
            _ => Value::Array(values),
        }
    }

    /// Returns the collapsed value without consuming the arguments.
    #[must_use]
    pub fn to_value(&self) -> Value {
        self.clone().into_value()
    }

    /// Interprets the arguments as keyword arguments.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::InvalidArguments`] when there is more
    /// than one argument, or the only argument is neither a mapping nor
    /// `null`.
    pub fn to_context(&self, adapter: &str, step: &str) -> Result<PipelineContext, TransactionError> {
        match self.0.as_slice() {
            [] | [Value::Null] => Ok(PipelineContext::new()),
            [Value::Object(map)] => Ok(PipelineContext::from(map.clone())),
            _ => Err(TransactionError::invalid_arguments(adapter, step)),
        }
    }
}

impl From<Value> for StepArgs {
    fn from(value: Value) -> Self {
        Self::single(value)
    }
}

impl From<PipelineContext> for StepArgs {
    fn from(ctx: PipelineContext) -> Self {
        Self::single(ctx.into_value())
    }
}

impl From<Vec<Value>> for StepArgs {
    fn from(values: Vec<Value>) -> Self {
        Self::from_values(values)
    }
}
