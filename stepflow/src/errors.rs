//! Error types for the stepflow crate.
//!
//! Two classes of problem exist. Misuse of the step DSL (malformed arguments,
//! unnameable steps, missing validators, unknown adapters) and errors raised
//! by collaborators are returned as [`TransactionError`]. Domain-level
//! outcomes are never errors: they travel through the transaction as
//! [`crate::core::Failure`] values.

use crate::transaction::Extension;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// The main error type for stepflow operations.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// An adapter that requires keyword arguments received something else.
    #[error("the {adapter} step only works with hash/keyword arguments (step '{step}')")]
    InvalidArguments {
        /// The adapter key.
        adapter: String,
        /// The step name.
        step: String,
    },

    /// No adapter is registered under the requested key.
    #[error("Unknown step adapter: {0}")]
    UnknownAdapter(String),

    /// A nested step has no explicit name and none can be derived.
    #[error(
        "unable to determine step name from {target}. Pass an explicit step name using `named` or `as_key`"
    )]
    AmbiguousStepName {
        /// Description of the target.
        target: String,
    },

    /// A `maybe` step target does not expose a validator.
    #[error("The object provided to the step ({target}) does not implement a `validator` method.")]
    NoValidator {
        /// Description of the target.
        target: String,
    },

    /// A container lookup found nothing under the key.
    #[error("Container '{container}' has nothing registered under '{key}'")]
    UnresolvedKey {
        /// The container name.
        container: String,
        /// The missing key.
        key: String,
    },

    /// An adapter was handed an operation kind it cannot run.
    #[error("Step '{step}' cannot run a {operation} operation with the '{adapter}' adapter")]
    IncompatibleOperation {
        /// The step name.
        step: String,
        /// The adapter key.
        adapter: String,
        /// The operation kind.
        operation: &'static str,
    },

    /// A capability was used without loading its extension.
    #[error("Extension '{0}' is not loaded")]
    ExtensionNotLoaded(Extension),

    /// Two steps share a name.
    #[error("Duplicate step name: {0}")]
    DuplicateStep(String),

    /// `validate` was declared more than once.
    #[error("Transaction '{0}' already has a validator bound")]
    ValidatorAlreadyBound(String),

    /// `perform_later` was used without a job queue.
    #[error("Transaction '{0}' has no transaction job configured")]
    NoJobQueue(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A persistence-layer error raised by an operation.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// A job queue error.
    #[error(transparent)]
    Job(#[from] JobError),

    /// Any other error raised by an operation.
    #[error(transparent)]
    Operation(#[from] anyhow::Error),
}

impl TransactionError {
    /// Creates an invalid arguments error.
    #[must_use]
    pub fn invalid_arguments(adapter: impl Into<String>, step: impl Into<String>) -> Self {
        Self::InvalidArguments {
            adapter: adapter.into(),
            step: step.into(),
        }
    }

    /// Creates an ambiguous step name error.
    #[must_use]
    pub fn ambiguous_step_name(target: impl Into<String>) -> Self {
        Self::AmbiguousStepName {
            target: target.into(),
        }
    }

    /// Creates a missing validator error.
    #[must_use]
    pub fn no_validator(target: impl Into<String>) -> Self {
        Self::NoValidator {
            target: target.into(),
        }
    }

    /// Creates an unresolved container key error.
    #[must_use]
    pub fn unresolved_key(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self::UnresolvedKey {
            container: container.into(),
            key: key.into(),
        }
    }

    /// The persistence error the rescue layer is allowed to convert, if any.
    #[must_use]
    pub fn rescuable(&self) -> Option<&PersistenceError> {
        match self {
            Self::Persistence(error) => Some(error),
            _ => None,
        }
    }
}

/// Errors raised by the persistence layer underneath an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PersistenceError {
    /// A record failed its own validations.
    #[error("Validation failed: {}", errors.join(", "))]
    RecordInvalid {
        /// The record type.
        model: String,
        /// Validation messages.
        errors: Vec<String>,
    },

    /// A record lookup found nothing.
    #[error("Couldn't find {model} with '{field}'={value}")]
    RecordNotFound {
        /// The record type.
        model: String,
        /// The lookup field.
        field: String,
        /// The lookup value.
        value: String,
    },

    /// A uniqueness constraint was violated.
    #[error("Duplicate {model}: {message}")]
    RecordNotUnique {
        /// The record type.
        model: String,
        /// The driver message.
        message: String,
    },
}

impl PersistenceError {
    /// Creates a record invalid error.
    #[must_use]
    pub fn record_invalid(model: impl Into<String>, errors: Vec<String>) -> Self {
        Self::RecordInvalid {
            model: model.into(),
            errors,
        }
    }

    /// Creates a record not found error.
    #[must_use]
    pub fn record_not_found(
        model: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::RecordNotFound {
            model: model.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a record not unique error.
    #[must_use]
    pub fn record_not_unique(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecordNotUnique {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        let kind = match self {
            Self::RecordInvalid { .. } => "RecordInvalid",
            Self::RecordNotFound { .. } => "RecordNotFound",
            Self::RecordNotUnique { .. } => "RecordNotUnique",
        };
        map.insert("type".to_string(), serde_json::json!(kind));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

/// Errors raised by a job queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// The queue refused or failed to accept the job.
    #[error("Failed to enqueue job '{target}': {reason}")]
    EnqueueFailed {
        /// The job target name.
        target: String,
        /// The reason for failure.
        reason: String,
    },

    /// The requested delay cannot be scheduled.
    #[error("Cannot schedule job '{target}' after {delay:?}")]
    InvalidDelay {
        /// The job target name.
        target: String,
        /// The rejected delay.
        delay: Duration,
    },
}

impl JobError {
    /// Creates an invalid delay error.
    #[must_use]
    pub fn invalid_delay(target: impl Into<String>, delay: Duration) -> Self {
        Self::InvalidDelay {
            target: target.into(),
            delay,
        }
    }

    /// Creates an enqueue failure.
    #[must_use]
    pub fn enqueue_failed(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnqueueFailed {
            target: target.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_arguments_message() {
        let err = TransactionError::invalid_arguments("merge", "user");
        assert_eq!(
            err.to_string(),
            "the merge step only works with hash/keyword arguments (step 'user')"
        );
    }

    #[test]
    fn test_persistence_error_is_rescuable() {
        let err: TransactionError = PersistenceError::record_not_found("User", "id", "42").into();
        assert!(matches!(err.rescuable(), Some(PersistenceError::RecordNotFound { .. })));
        assert!(err.to_string().contains("Couldn't find User"));

        let err = TransactionError::Operation(anyhow::anyhow!("boom"));
        assert!(err.rescuable().is_none());
    }

    #[test]
    fn test_persistence_error_to_dict() {
        let err = PersistenceError::record_invalid("User", vec!["Email is taken".to_string()]);
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "RecordInvalid");
        assert_eq!(dict.get("message").unwrap(), "Validation failed: Email is taken");
    }

    #[test]
    fn test_no_validator_message() {
        let err = TransactionError::no_validator("FindUser");
        assert!(err.to_string().contains("(FindUser)"));
    }

    #[test]
    fn test_job_error_display() {
        let err = JobError::enqueue_failed("CleanupJob", "queue offline");
        assert_eq!(err.to_string(), "Failed to enqueue job 'CleanupJob': queue offline");
    }
}
