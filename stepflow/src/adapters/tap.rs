//! The `tap` adapter.

use super::StepAdapter;
use crate::core::{StepArgs, StepOptions, StepResult};
use crate::errors::TransactionError;
use crate::operations::StepOperation;
use async_trait::async_trait;

/// Runs the operation for its side effects.
///
/// A `Failure` from the operation halts the transaction as usual. Any
/// success value is discarded and the step's own input is returned, so the
/// next step sees exactly what this one received.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tap;

#[async_trait]
impl StepAdapter for Tap {
    fn key(&self) -> &'static str {
        "tap"
    }

    async fn call(
        &self,
        operation: &StepOperation,
        options: &StepOptions,
        args: StepArgs,
    ) -> Result<StepResult, TransactionError> {
        let result = operation
            .invoke(self.key(), &options.step_name, args.clone())
            .await?;

        Ok(match result {
            StepResult::Success(_) => StepResult::Success(args.into_value()),
            failure @ StepResult::Failure(_) => failure,
        })
    }
}
