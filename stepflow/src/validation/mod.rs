//! Validators and validation results.
//!
//! This module provides:
//! - The [`Validator`] trait consumed by the `valid` adapter, the validation
//!   gate, `maybe` steps and async dispatch
//! - [`ValidationResult`], the pass/fail object with an error map
//! - A small schema engine ([`Schema`]) with contract configuration

mod contract;
mod result;
mod schema;

pub use contract::{ContractConfig, TypeContainer, TypeDefinition};
pub use result::ValidationResult;
pub use schema::{FieldType, Predicate, Rule, RuleKind, Schema};

use crate::core::{PipelineContext, StepArgs};
use std::fmt;
use std::sync::Arc;

/// A schema or contract that checks keyword input.
pub trait Validator: Send + Sync {
    /// Runs the validation.
    fn call(&self, input: &PipelineContext) -> ValidationResult;

    /// Name used when the validator becomes a step on its own.
    fn name(&self) -> Option<&str> {
        None
    }
}

impl fmt::Debug for dyn Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("name", &self.name())
            .finish()
    }
}

/// Produces the validator a `valid` step should run.
///
/// Step methods that build their schema from the incoming arguments
/// implement this directly; literal validators are wrapped in
/// [`StaticValidator`].
pub trait ValidatorSource: Send + Sync {
    /// Returns the validator for these arguments.
    fn validator(&self, args: &StepArgs) -> Arc<dyn Validator>;
}

impl<F> ValidatorSource for F
where
    F: Fn(&StepArgs) -> Arc<dyn Validator> + Send + Sync,
{
    fn validator(&self, args: &StepArgs) -> Arc<dyn Validator> {
        self(args)
    }
}

/// A validator source that always yields the same validator.
#[derive(Clone)]
pub struct StaticValidator(Arc<dyn Validator>);

impl StaticValidator {
    /// Wraps a validator.
    #[must_use]
    pub fn new(validator: Arc<dyn Validator>) -> Self {
        Self(validator)
    }
}

impl ValidatorSource for StaticValidator {
    fn validator(&self, _args: &StepArgs) -> Arc<dyn Validator> {
        Arc::clone(&self.0)
    }
}
