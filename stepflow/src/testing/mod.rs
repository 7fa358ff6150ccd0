//! Testing utilities for stepflow transactions.
//!
//! This module provides:
//! - Mock operations that record calls or raise errors
//! - Fixtures for validation scenarios
//! - Assertions for step results and event sequences

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_events, assert_failure, assert_success, assert_validation_errors};
pub use fixtures::{context, person_input, person_schema};
pub use mocks::{FailingOperation, RecordingOperation};
