//! The `merge` adapter.

use super::StepAdapter;
use crate::core::{PipelineContext, StepArgs, StepOptions, StepResult};
use crate::errors::TransactionError;
use crate::operations::StepOperation;
use async_trait::async_trait;
use serde_json::Value;

/// Merges the operation's output into the keyword input.
///
/// The output lands under the `as` option when given. A mapping output is
/// merged key by key. Anything else is stored under the step name. Keys of
/// the input survive unless the output overwrites them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Merge;

impl Merge {
    /// Builds the keys a step output contributes to the context.
    #[must_use]
    pub fn new_keys(options: &StepOptions, value: Value) -> PipelineContext {
        if let Some(key) = &options.as_key {
            return PipelineContext::new().with(key.clone(), value);
        }
        match value {
            Value::Object(map) => PipelineContext::from(map),
            other => PipelineContext::new().with(options.step_name.clone(), other),
        }
    }
}

#[async_trait]
impl StepAdapter for Merge {
    fn key(&self) -> &'static str {
        "merge"
    }

    async fn call(
        &self,
        operation: &StepOperation,
        options: &StepOptions,
        args: StepArgs,
    ) -> Result<StepResult, TransactionError> {
        let context = args.to_context(self.key(), &options.step_name)?;
        let result = operation
            .invoke(self.key(), &options.step_name, args)
            .await?;

        Ok(match result {
            StepResult::Success(value) => {
                let merged = context.merge(Self::new_keys(options, value));
                StepResult::Success(merged.into_value())
            }
            failure @ StepResult::Failure(_) => failure,
        })
    }
}
