//! Assertions for step results.

use crate::core::{Failure, StepResult};
use crate::events::CollectingEventSink;
use serde_json::Value;

/// Asserts `result` is a `Success` carrying `expected`.
pub fn assert_success(result: &StepResult, expected: &Value) {
    assert_eq!(
        result.value(),
        Some(expected),
        "Expected Success({expected}), got {result:?}"
    );
}

/// Asserts `result` is a `Failure` and returns its detail.
pub fn assert_failure(result: &StepResult) -> &Failure {
    match result.failure_detail() {
        Some(failure) => failure,
        None => panic!("Expected Failure, got {result:?}"),
    }
}

/// Asserts `result` failed validation with `messages` for `key`.
pub fn assert_validation_errors(result: &StepResult, key: &str, messages: &[&str]) {
    let failure = assert_failure(result);
    let Some(validation) = failure.as_validation() else {
        panic!("Expected validation failure, got {failure:?}");
    };
    assert_eq!(
        validation.errors_for(key),
        messages,
        "Unexpected messages for '{key}'"
    );
}

/// Asserts the sink received exactly these event names, in order.
pub fn assert_events(sink: &CollectingEventSink, expected: &[&str]) {
    assert_eq!(sink.names(), expected, "Unexpected event sequence");
}
