//! The `valid` adapter.

use super::StepAdapter;
use crate::core::{StepArgs, StepOptions, StepResult};
use crate::errors::TransactionError;
use crate::operations::StepOperation;
use async_trait::async_trait;

/// Validates the keyword input.
///
/// The step's operation is a validator source. On success the validated
/// output replaces the context; on failure the raw validation result is
/// returned as the failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct Valid;

#[async_trait]
impl StepAdapter for Valid {
    fn key(&self) -> &'static str {
        "valid"
    }

    async fn call(
        &self,
        operation: &StepOperation,
        options: &StepOptions,
        args: StepArgs,
    ) -> Result<StepResult, TransactionError> {
        let context = args.to_context(self.key(), &options.step_name)?;
        let validator = operation.validator_for(self.key(), &options.step_name, &args)?;
        let result = validator.call(&context);

        Ok(if result.is_success() {
            StepResult::Success(result.to_context().into_value())
        } else {
            StepResult::failure(result)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{FieldType, Rule, Schema, StaticValidator, Validator};
    use serde_json::json;
    use std::sync::Arc;

    fn schema_step() -> StepOperation {
        let schema: Arc<dyn Validator> = Arc::new(
            Schema::new()
                .required("name", Rule::filled(FieldType::String))
                .optional("age", Rule::value(FieldType::Integer)),
        );
        StepOperation::Validator(Arc::new(StaticValidator::new(schema)))
    }

    #[tokio::test]
    async fn test_valid_input_returns_output() {
        let result = Valid
            .call(
                &schema_step(),
                &StepOptions::new("validate"),
                StepArgs::single(json!({"name": "Jane", "age": "30", "extra": true})),
            )
            .await
            .unwrap();

        assert_eq!(result, StepResult::success(json!({"name": "Jane", "age": 30})));
    }

    #[tokio::test]
    async fn test_invalid_input_returns_validation_failure() {
        let result = Valid
            .call(&schema_step(), &StepOptions::new("validate"), StepArgs::single(json!({"name": ""})))
            .await
            .unwrap();

        let failure = result.failure_detail().and_then(|f| f.as_validation()).unwrap();
        assert_eq!(failure.errors_for("name").to_vec(), vec!["must be filled".to_string()]);
    }

    #[tokio::test]
    async fn test_validator_built_from_args() {
        let source = |args: &StepArgs| -> Arc<dyn Validator> {
            let strict = args
                .first()
                .and_then(|v| v.get("strict"))
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false);
            let schema = Schema::new().optional("strict", Rule::value(FieldType::Bool));
            if strict {
                Arc::new(schema.required("email", Rule::filled(FieldType::String)))
            } else {
                Arc::new(schema)
            }
        };
        let op = StepOperation::Validator(Arc::new(source));

        let lenient = Valid
            .call(&op, &StepOptions::new("check"), StepArgs::single(json!({"strict": false})))
            .await
            .unwrap();
        assert!(lenient.is_success());

        let strict = Valid
            .call(&op, &StepOptions::new("check"), StepArgs::single(json!({"strict": true})))
            .await
            .unwrap();
        assert!(strict.is_failure());
    }

    #[tokio::test]
    async fn test_callable_is_incompatible() {
        let op = StepOperation::Call(crate::operations::operation(|_| Ok(StepResult::success(json!(1)))));
        let err = Valid
            .call(&op, &StepOptions::new("check"), StepArgs::empty())
            .await
            .unwrap_err();
        assert!(matches!(err, TransactionError::IncompatibleOperation { .. }));
    }
}
