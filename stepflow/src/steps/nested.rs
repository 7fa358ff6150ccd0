//! Steps that invoke another transaction or operation.

use crate::container::Container;
use crate::core::{StepArgs, StepResult};
use crate::errors::TransactionError;
use crate::operations::{Operation, StepOperation};
use crate::transaction::StepDefinition;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

type InputBuilder = Arc<dyn Fn(&StepArgs) -> Value + Send + Sync>;

/// Where a nested step finds its target.
#[derive(Clone)]
pub enum NestedTarget {
    /// A target fixed when the transaction is defined.
    Static(Arc<dyn Operation>),
    /// A key resolved in a container each time the step runs.
    Keyed {
        /// The container to look in.
        container: Arc<Container>,
        /// The registered key.
        key: String,
    },
}

impl NestedTarget {
    fn derived_name(&self) -> Option<String> {
        match self {
            Self::Static(operation) => operation.name().map(str::to_string),
            Self::Keyed { container, key } => Some(format!("{}.{key}", container.name())),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Static(operation) => operation.name().unwrap_or("an anonymous operation").to_string(),
            Self::Keyed { container, key } => format!("{}[{key}]", container.name()),
        }
    }

    fn resolve(&self) -> Result<Arc<dyn Operation>, TransactionError> {
        match self {
            Self::Static(operation) => Ok(Arc::clone(operation)),
            Self::Keyed { container, key } => container.resolve(key),
        }
    }
}

impl fmt::Debug for NestedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Builder for `use` and `maybe` steps.
///
/// Both become `merge` steps: the target's success value is merged into the
/// keyword input by the usual merge rules.
///
/// ```ignore
/// let step = NestedStep::using(find_user).as_key("user").into_definition()?;
/// let step = NestedStep::using_key(container, "users.find").maybe().into_definition()?;
/// ```
#[derive(Clone)]
pub struct NestedStep {
    target: NestedTarget,
    name: Option<String>,
    as_key: Option<String>,
    build_input: Option<InputBuilder>,
    maybe: bool,
}

impl NestedStep {
    /// Nests a fixed operation or transaction.
    #[must_use]
    pub fn using(target: Arc<dyn Operation>) -> Self {
        Self::new(NestedTarget::Static(target))
    }

    /// Nests whatever the container holds under `key` at call time.
    #[must_use]
    pub fn using_key(container: Arc<Container>, key: impl Into<String>) -> Self {
        Self::new(NestedTarget::Keyed {
            container,
            key: key.into(),
        })
    }

    fn new(target: NestedTarget) -> Self {
        Self {
            target,
            name: None,
            as_key: None,
            build_input: None,
            maybe: false,
        }
    }

    /// Names the step explicitly.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Merges the output under `key`. Also names the step when no explicit
    /// name is given.
    #[must_use]
    pub fn as_key(mut self, key: impl Into<String>) -> Self {
        self.as_key = Some(key.into());
        self
    }

    /// Reshapes the step arguments before they reach the target.
    #[must_use]
    pub fn build_input<F>(mut self, builder: F) -> Self
    where
        F: Fn(&StepArgs) -> Value + Send + Sync + 'static,
    {
        self.build_input = Some(Arc::new(builder));
        self
    }

    /// Only invokes the target when its validator accepts the input;
    /// otherwise the input passes through untouched.
    #[must_use]
    pub fn maybe(mut self) -> Self {
        self.maybe = true;
        self
    }

    /// Resolves the step name.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::AmbiguousStepName`] if there is no
    /// explicit name and the target has none.
    pub fn step_name(&self) -> Result<String, TransactionError> {
        self.name
            .clone()
            .or_else(|| self.as_key.clone())
            .or_else(|| self.target.derived_name())
            .ok_or_else(|| TransactionError::ambiguous_step_name(self.target.describe()))
    }

    /// Produces the `merge` step definition.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::AmbiguousStepName`] when no name can be
    /// derived, and [`TransactionError::NoValidator`] for a `maybe` step
    /// whose fixed target has no validator.
    pub fn into_definition(self) -> Result<StepDefinition, TransactionError> {
        let name = self.step_name()?;

        if self.maybe {
            if let NestedTarget::Static(operation) = &self.target {
                if operation.validator().is_none() {
                    return Err(TransactionError::no_validator(self.target.describe()));
                }
            }
        }

        let as_key = self.as_key.clone();
        let operation: Arc<dyn Operation> = Arc::new(NestedOperation {
            name: name.clone(),
            step: self,
        });
        let definition = StepDefinition::new("merge", name, StepOperation::Call(operation));

        Ok(match as_key {
            Some(key) => definition.with_as(key),
            None => definition,
        })
    }
}

impl fmt::Debug for NestedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestedStep")
            .field("target", &self.target)
            .field("name", &self.name)
            .field("as_key", &self.as_key)
            .field("build_input", &self.build_input.is_some())
            .field("maybe", &self.maybe)
            .finish()
    }
}

struct NestedOperation {
    name: String,
    step: NestedStep,
}

impl NestedOperation {
    fn input_for(&self, args: &StepArgs) -> StepArgs {
        match &self.step.build_input {
            Some(builder) => StepArgs::single(builder(args)),
            None => args.clone(),
        }
    }
}

#[async_trait]
impl Operation for NestedOperation {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    async fn call(&self, args: StepArgs) -> Result<StepResult, TransactionError> {
        let target = self.step.target.resolve()?;

        if self.step.maybe {
            let validator = target
                .validator()
                .ok_or_else(|| TransactionError::no_validator(self.step.target.describe()))?;
            let context = args.to_context("merge", &self.name)?;
            if validator.call(&context).is_failure() {
                debug!(step = %self.name, "Nested validator rejected input, skipping");
                return Ok(StepResult::Success(args.into_value()));
            }
        }

        target.call(self.input_for(&args)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{operation, FnOperation};
    use crate::validation::{FieldType, Rule, Schema, Validator};
    use serde_json::json;

    struct Guarded;

    #[async_trait]
    impl Operation for Guarded {
        fn name(&self) -> Option<&str> {
            Some("VerifyEmail")
        }

        fn validator(&self) -> Option<Arc<dyn Validator>> {
            Some(Arc::new(Schema::new().required("email", Rule::filled(FieldType::String))))
        }

        async fn call(&self, _args: StepArgs) -> Result<StepResult, TransactionError> {
            Ok(StepResult::success(json!("verified")))
        }
    }

    async fn run(definition: &StepDefinition, input: Value) -> StepResult {
        let StepOperation::Call(op) = definition.operation() else {
            panic!("nested steps wrap a callable");
        };
        op.call(StepArgs::single(input)).await.unwrap()
    }

    #[test]
    fn test_step_names() {
        let named = FnOperation::new(|_| Ok(StepResult::success(json!(1)))).named("FindUser");
        let step = NestedStep::using(Arc::new(named)).into_definition().unwrap();
        assert_eq!(step.name(), "FindUser");
        assert_eq!(step.adapter(), "merge");

        let container = Arc::new(Container::new("Users"));
        let step = NestedStep::using_key(container, "find").into_definition().unwrap();
        assert_eq!(step.name(), "Users.find");

        let step = NestedStep::using(operation(|_| Ok(StepResult::success(json!(1)))))
            .as_key("user")
            .into_definition()
            .unwrap();
        assert_eq!(step.name(), "user");
        assert_eq!(step.options().as_key.as_deref(), Some("user"));
    }

    #[test]
    fn test_anonymous_target_needs_a_name() {
        let err = NestedStep::using(operation(|_| Ok(StepResult::success(json!(1)))))
            .into_definition()
            .unwrap_err();
        assert!(matches!(err, TransactionError::AmbiguousStepName { .. }));
    }

    #[test]
    fn test_maybe_requires_validator() {
        let err = NestedStep::using(operation(|_| Ok(StepResult::success(json!(1)))))
            .named("anything")
            .maybe()
            .into_definition()
            .unwrap_err();
        assert!(matches!(err, TransactionError::NoValidator { .. }));
    }

    #[tokio::test]
    async fn test_maybe_gates_on_validator() {
        let step = NestedStep::using(Arc::new(Guarded)).maybe().into_definition().unwrap();

        let passed = run(&step, json!({"email": "jane@doe.com"})).await;
        assert_eq!(passed, StepResult::success(json!("verified")));

        let skipped = run(&step, json!({"email": ""})).await;
        assert_eq!(skipped, StepResult::success(json!({"email": ""})));
    }

    #[tokio::test]
    async fn test_build_input_reshapes_args() {
        let echo = FnOperation::new(|args: StepArgs| Ok(StepResult::success(args.into_value())))
            .named("LoadProfile");
        let step = NestedStep::using(Arc::new(echo))
            .build_input(|args| json!({"customer_id": args.first().map(|v| v["user_id"].clone())}))
            .into_definition()
            .unwrap();

        let result = run(&step, json!({"user_id": 9, "cart": "c1"})).await;
        assert_eq!(result, StepResult::success(json!({"customer_id": 9})));
    }

    #[tokio::test]
    async fn test_container_key_resolved_late() {
        let container = Arc::new(Container::new("Users"));
        let step = NestedStep::using_key(Arc::clone(&container), "find")
            .into_definition()
            .unwrap();

        let StepOperation::Call(op) = step.operation() else {
            panic!("nested steps wrap a callable");
        };
        let err = op.call(StepArgs::empty()).await.unwrap_err();
        assert!(matches!(err, TransactionError::UnresolvedKey { .. }));

        container.register("find", operation(|_| Ok(StepResult::success(json!("some user")))));
        assert_eq!(run(&step, json!({})).await, StepResult::success(json!("some user")));
    }

    #[tokio::test]
    async fn test_container_maybe_checks_validator_at_call_time() {
        let container = Arc::new(Container::new("Users"));
        container.register("find", operation(|_| Ok(StepResult::success(json!(1)))));
        let step = NestedStep::using_key(container, "find").maybe().into_definition().unwrap();

        let StepOperation::Call(op) = step.operation() else {
            panic!("nested steps wrap a callable");
        };
        let err = op.call(StepArgs::single(json!({}))).await.unwrap_err();
        assert!(matches!(err, TransactionError::NoValidator { .. }));
    }
}
