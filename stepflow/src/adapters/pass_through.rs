//! The plain `step` adapter.

use super::StepAdapter;
use crate::core::{StepArgs, StepOptions, StepResult};
use crate::errors::TransactionError;
use crate::operations::StepOperation;
use async_trait::async_trait;

/// Returns the operation's result unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

#[async_trait]
impl StepAdapter for PassThrough {
    fn key(&self) -> &'static str {
        "step"
    }

    async fn call(
        &self,
        operation: &StepOperation,
        options: &StepOptions,
        args: StepArgs,
    ) -> Result<StepResult, TransactionError> {
        operation.invoke(self.key(), &options.step_name, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::operation;
    use serde_json::json;

    #[tokio::test]
    async fn test_result_is_returned_as_is() {
        let op = StepOperation::Call(operation(|_| Ok(StepResult::success(json!("new")))));
        let result = PassThrough
            .call(&op, &StepOptions::new("replace"), StepArgs::single(json!({"a": 1})))
            .await
            .unwrap();

        assert_eq!(result, StepResult::success(json!("new")));
    }
}
