//! Steps that enqueue a job instead of doing the work inline.

use crate::core::{PipelineContext, StepArgs, StepResult};
use crate::errors::TransactionError;
use crate::jobs::{AsyncTarget, EnqueueOptions};
use crate::operations::{Operation, StepOperation};
use crate::transaction::StepDefinition;
use crate::utils::underscore;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Builder for `async` steps.
///
/// The step validates its input against the target's validator, enqueues
/// the target with the validated fields, and always succeeds with its own
/// input. Invalid or non-mapping input is not enqueued when the target has
/// a validator. Queue errors are logged and swallowed; nothing the job does
/// can fail the transaction.
#[derive(Clone)]
pub struct DispatchStep {
    target: Arc<dyn AsyncTarget>,
    delay: Option<Duration>,
}

impl DispatchStep {
    /// Dispatches to `target`.
    #[must_use]
    pub fn new(target: Arc<dyn AsyncTarget>) -> Self {
        Self { target, delay: None }
    }

    /// Delays the job.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// The step name: the target name, underscored.
    #[must_use]
    pub fn step_name(&self) -> String {
        underscore(self.target.name())
    }

    /// Produces the `step` definition.
    #[must_use]
    pub fn into_definition(self) -> StepDefinition {
        let name = self.step_name();
        let operation: Arc<dyn Operation> = Arc::new(DispatchOperation {
            name: name.clone(),
            step: self,
        });
        StepDefinition::new("step", name, StepOperation::Call(operation))
    }
}

impl fmt::Debug for DispatchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchStep")
            .field("target", &self.target.name())
            .field("delay", &self.delay)
            .finish()
    }
}

struct DispatchOperation {
    name: String,
    step: DispatchStep,
}

impl DispatchOperation {
    fn options(&self) -> EnqueueOptions {
        EnqueueOptions { delay: self.step.delay }
    }
}

#[async_trait]
impl Operation for DispatchOperation {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    async fn call(&self, args: StepArgs) -> Result<StepResult, TransactionError> {
        let input = match args.into_value() {
            Value::Null => Value::Object(serde_json::Map::new()),
            value => value,
        };
        let target = &self.step.target;

        let job_args = match target.validator() {
            Some(validator) => {
                let Some(context) = PipelineContext::from_value(input.clone()) else {
                    debug!(step = %self.name, "Job input is not a mapping, not enqueued");
                    return Ok(StepResult::Success(input));
                };
                let result = validator.call(&context);
                if result.is_failure() {
                    debug!(step = %self.name, errors = ?result.errors(), "Job input invalid, not enqueued");
                    return Ok(StepResult::Success(input));
                }
                StepArgs::from(result.to_context())
            }
            None => StepArgs::single(input.clone()),
        };

        match target.perform_later(job_args, self.options()).await {
            Ok(StepResult::Success(ack)) => {
                debug!(step = %self.name, ack = %ack, "Job enqueued");
            }
            Ok(StepResult::Failure(failure)) => {
                warn!(step = %self.name, failure = %failure.to_value(), "Job target refused input");
            }
            Err(TransactionError::Job(error)) => {
                warn!(step = %self.name, error = %error, "Failed to enqueue job");
            }
            Err(error) => return Err(error),
        }

        Ok(StepResult::Success(input))
    }
}
