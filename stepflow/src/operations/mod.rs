//! Operation trait and implementations.
//!
//! Operations are the units of work wrapped by steps. Every operation
//! returns a tagged [`StepResult`]; raising an error is reserved for
//! problems that should stop the whole transaction.

use crate::core::{StepArgs, StepResult};
use crate::errors::TransactionError;
use crate::validation::{Validator, ValidatorSource};
use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// Trait for step operations.
#[async_trait]
pub trait Operation: Send + Sync {
    /// The operation's own name, used to name nested steps.
    fn name(&self) -> Option<&str> {
        None
    }

    /// The validator guarding this operation, if it has one.
    fn validator(&self) -> Option<Arc<dyn Validator>> {
        None
    }

    /// Runs the operation.
    async fn call(&self, args: StepArgs) -> Result<StepResult, TransactionError>;
}

impl Debug for dyn Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name())
            .finish()
    }
}

/// What a step hands to its adapter.
#[derive(Clone)]
pub enum StepOperation {
    /// A callable invoked with the step arguments.
    Call(Arc<dyn Operation>),
    /// A source of the validator a `valid` step runs.
    Validator(Arc<dyn ValidatorSource>),
}

impl StepOperation {
    /// Short description of the operation kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Call(_) => "callable",
            Self::Validator(_) => "validator",
        }
    }

    /// Invokes a callable operation.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::IncompatibleOperation`] for validator
    /// sources, and whatever the operation itself raises.
    pub async fn invoke(
        &self,
        adapter: &str,
        step: &str,
        args: StepArgs,
    ) -> Result<StepResult, TransactionError> {
        match self {
            Self::Call(operation) => operation.call(args).await,
            Self::Validator(_) => Err(self.incompatible(adapter, step)),
        }
    }

    /// Produces the validator of a validator source.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::IncompatibleOperation`] for callables.
    pub fn validator_for(
        &self,
        adapter: &str,
        step: &str,
        args: &StepArgs,
    ) -> Result<Arc<dyn Validator>, TransactionError> {
        match self {
            Self::Validator(source) => Ok(source.validator(args)),
            Self::Call(_) => Err(self.incompatible(adapter, step)),
        }
    }

    fn incompatible(&self, adapter: &str, step: &str) -> TransactionError {
        TransactionError::IncompatibleOperation {
            step: step.to_string(),
            adapter: adapter.to_string(),
            operation: self.kind(),
        }
    }
}

impl Debug for StepOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Call(operation) => f
                .debug_tuple("Call")
                .field(&operation.name().unwrap_or("<anonymous>"))
                .finish(),
            Self::Validator(_) => f.debug_tuple("Validator").finish(),
        }
    }
}

impl From<Arc<dyn Operation>> for StepOperation {
    fn from(operation: Arc<dyn Operation>) -> Self {
        Self::Call(operation)
    }
}

/// A function-based operation.
pub struct FnOperation<F>
where
    F: Fn(StepArgs) -> Result<StepResult, TransactionError> + Send + Sync,
{
    name: Option<String>,
    func: F,
}

impl<F> FnOperation<F>
where
    F: Fn(StepArgs) -> Result<StepResult, TransactionError> + Send + Sync,
{
    /// Creates an anonymous function-based operation.
    pub fn new(func: F) -> Self {
        Self { name: None, func }
    }

    /// Names the operation.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<F> Debug for FnOperation<F>
where
    F: Fn(StepArgs) -> Result<StepResult, TransactionError> + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOperation")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl<F> Operation for FnOperation<F>
where
    F: Fn(StepArgs) -> Result<StepResult, TransactionError> + Send + Sync,
{
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    async fn call(&self, args: StepArgs) -> Result<StepResult, TransactionError> {
        (self.func)(args)
    }
}

/// An async function-based operation.
pub struct AsyncFnOperation<F, Fut>
where
    F: Fn(StepArgs) -> Fut + Send + Sync,
    Fut: Future<Output = Result<StepResult, TransactionError>> + Send,
{
    name: Option<String>,
    func: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> AsyncFnOperation<F, Fut>
where
    F: Fn(StepArgs) -> Fut + Send + Sync,
    Fut: Future<Output = Result<StepResult, TransactionError>> + Send,
{
    /// Creates an anonymous async operation.
    pub fn new(func: F) -> Self {
        Self {
            name: None,
            func,
            _phantom: PhantomData,
        }
    }

    /// Names the operation.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<F, Fut> Debug for AsyncFnOperation<F, Fut>
where
    F: Fn(StepArgs) -> Fut + Send + Sync,
    Fut: Future<Output = Result<StepResult, TransactionError>> + Send,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncFnOperation")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl<F, Fut> Operation for AsyncFnOperation<F, Fut>
where
    F: Fn(StepArgs) -> Fut + Send + Sync,
    Fut: Future<Output = Result<StepResult, TransactionError>> + Send,
{
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    async fn call(&self, args: StepArgs) -> Result<StepResult, TransactionError> {
        (self.func)(args).await
    }
}

/// Wraps a closure as a shared operation.
pub fn operation<F>(func: F) -> Arc<dyn Operation>
where
    F: Fn(StepArgs) -> Result<StepResult, TransactionError> + Send + Sync + 'static,
{
    Arc::new(FnOperation::new(func))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{FieldType, Rule, Schema, StaticValidator};
    use serde_json::json;

    #[tokio::test]
    async fn test_fn_operation() {
        let op = FnOperation::new(|args: StepArgs| Ok(StepResult::success(args.into_value())))
            .named("echo");

        assert_eq!(op.name(), Some("echo"));
        let result = op.call(StepArgs::single(json!(1))).await.unwrap();
        assert_eq!(result, StepResult::success(json!(1)));
    }

    #[tokio::test]
    async fn test_async_fn_operation() {
        let op = AsyncFnOperation::new(|_args: StepArgs| async { Ok(StepResult::success(json!("later"))) });

        assert!(op.name().is_none());
        let result = op.call(StepArgs::empty()).await.unwrap();
        assert_eq!(result, StepResult::success(json!("later")));
    }

    #[tokio::test]
    async fn test_validator_operation_cannot_be_invoked() {
        let schema: Arc<dyn Validator> = Arc::new(Schema::new().required("name", Rule::filled(FieldType::String)));
        let op = StepOperation::Validator(Arc::new(StaticValidator::new(schema)));

        let err = op.invoke("tap", "check", StepArgs::empty()).await.unwrap_err();
        assert!(matches!(err, TransactionError::IncompatibleOperation { operation: "validator", .. }));
    }

    #[test]
    fn test_shared_operation_debug_shows_name() {
        let op: Arc<dyn Operation> = Arc::new(
            FnOperation::new(|_| Ok(StepResult::success(json!(null)))).named("users.find"),
        );
        assert_eq!(format!("{op:?}"), r#"Operation { name: Some("users.find") }"#);
    }

    #[test]
    fn test_callable_has_no_validator() {
        let op = StepOperation::Call(operation(|_| Ok(StepResult::success(json!(null)))));
        assert!(op.validator_for("valid", "check", &StepArgs::empty()).is_err());
    }
}
