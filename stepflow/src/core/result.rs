//! Success/Failure result threaded through every step.

use crate::errors::PersistenceError;
use crate::validation::ValidationResult;
use serde::Serialize;
use serde_json::Value;

/// The tagged result of a step or a whole transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    /// The step succeeded with a value.
    Success(Value),
    /// The step failed; the transaction halts.
    Failure(Failure),
}

impl StepResult {
    /// Creates a success.
    #[must_use]
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success(value.into())
    }

    /// Creates a failure.
    #[must_use]
    pub fn failure(detail: impl Into<Failure>) -> Self {
        Self::Failure(detail.into())
    }

    /// Returns true for `Success`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true for `Failure`.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Returns the success value.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Returns the failure detail.
    #[must_use]
    pub fn failure_detail(&self) -> Option<&Failure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// Chains another computation on success.
    #[must_use]
    pub fn and_then(self, f: impl FnOnce(Value) -> Self) -> Self {
        match self {
            Self::Success(value) => f(value),
            failure @ Self::Failure(_) => failure,
        }
    }

    /// Recovers from a failure.
    #[must_use]
    pub fn or_else(self, f: impl FnOnce(Failure) -> Self) -> Self {
        match self {
            success @ Self::Success(_) => success,
            Self::Failure(failure) => f(failure),
        }
    }

    /// Maps the success value.
    #[must_use]
    pub fn map(self, f: impl FnOnce(Value) -> Value) -> Self {
        match self {
            Self::Success(value) => Self::Success(f(value)),
            failure @ Self::Failure(_) => failure,
        }
    }

    /// Converts into a standard `Result`.
    pub fn into_result(self) -> Result<Value, Failure> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(failure) => Err(failure),
        }
    }
}

impl From<Result<Value, Failure>> for StepResult {
    fn from(result: Result<Value, Failure>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(failure) => Self::Failure(failure),
        }
    }
}

/// The detail carried by a failed step.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// A domain failure returned by an operation.
    Value(Value),
    /// The raw result of a rejected validation.
    Validation(ValidationResult),
    /// A persistence error converted by the rescue layer.
    Rescued(RescuedFailure),
}

impl Failure {
    /// Returns the validation result, if this is a validation failure.
    #[must_use]
    pub fn as_validation(&self) -> Option<&ValidationResult> {
        match self {
            Self::Validation(result) => Some(result),
            _ => None,
        }
    }

    /// Returns a JSON representation for event payloads.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Validation(result) => serde_json::json!({ "errors": result.errors() }),
            Self::Rescued(rescued) => rescued.value(),
        }
    }
}

impl From<Value> for Failure {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Self::Value(Value::String(message.to_string()))
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Self::Value(Value::String(message))
    }
}

impl From<ValidationResult> for Failure {
    fn from(result: ValidationResult) -> Self {
        Self::Validation(result)
    }
}

impl From<RescuedFailure> for Failure {
    fn from(rescued: RescuedFailure) -> Self {
        Self::Rescued(rescued)
    }
}

/// A raised persistence error turned into a step failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RescuedFailure {
    /// The step that raised.
    pub step_name: String,
    /// The original error.
    pub error: PersistenceError,
    /// The configured replacement message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RescuedFailure {
    /// Creates a rescued failure.
    #[must_use]
    pub fn new(step_name: impl Into<String>, error: PersistenceError, message: Option<String>) -> Self {
        Self {
            step_name: step_name.into(),
            error,
            message,
        }
    }

    /// The configured message, or the original error's message.
    #[must_use]
    pub fn message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| self.error.to_string())
    }

    /// The failure value: the configured message, or the error's type and message.
    #[must_use]
    pub fn value(&self) -> Value {
        match &self.message {
            Some(message) => Value::String(message.clone()),
            None => Value::Object(self.error.to_dict().into_iter().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_and_failure_predicates() {
        let ok = StepResult::success(json!(1));
        assert!(ok.is_success());
        assert_eq!(ok.value(), Some(&json!(1)));

        let failed = StepResult::failure("oops");
        assert!(failed.is_failure());
        assert_eq!(failed.failure_detail(), Some(&Failure::Value(json!("oops"))));
    }

    #[test]
    fn test_and_then_short_circuits_on_failure() {
        let result = StepResult::failure("first").and_then(|_| StepResult::success(json!(2)));
        assert_eq!(result, StepResult::failure("first"));

        let result = StepResult::success(json!(1)).and_then(|v| StepResult::success(json!([v, 2])));
        assert_eq!(result, StepResult::success(json!([1, 2])));
    }

    #[test]
    fn test_or_else_recovers() {
        let result = StepResult::failure("nope").or_else(|_| StepResult::success(json!("fallback")));
        assert_eq!(result, StepResult::success(json!("fallback")));
    }

    #[test]
    fn test_rescued_failure_value_prefers_message() {
        let error = PersistenceError::record_not_found("User", "id", "1");
        let with_message = RescuedFailure::new("find_user", error.clone(), Some("No user".into()));
        assert_eq!(with_message.value(), json!("No user"));
        assert_eq!(with_message.message(), "No user");

        let without = RescuedFailure::new("find_user", error, None);
        assert_eq!(without.value()["type"], json!("RecordNotFound"));
        assert_eq!(without.value()["message"], json!("Couldn't find User with 'id'=1"));
        assert!(without.message().contains("Couldn't find User"));
    }

    #[test]
    fn test_into_result_roundtrip() {
        let result: StepResult = Ok::<_, Failure>(json!(3)).into();
        assert_eq!(result.into_result(), Ok(json!(3)));
    }
}
