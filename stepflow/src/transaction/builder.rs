//! Transaction declaration.

use super::{Extension, Step, StepDefinition, Transaction};
use crate::adapters::{StepAdapterRegistry, STEP_ADAPTERS};
use crate::config::{RescueConfig, StepflowConfig};
use crate::errors::TransactionError;
use crate::events::{EventSink, LoggingEventSink};
use crate::interceptors::{InterceptorChain, RescueInterceptor, StepInterceptor};
use crate::jobs::JobQueue;
use crate::operations::{Operation, StepOperation};
use crate::steps::{DispatchStep, NestedStep};
use crate::validation::{ContractConfig, Schema, StaticValidator, Validator, ValidatorSource};
use std::sync::Arc;
use tracing::debug;

const VALIDATE_STEP: &str = "validate";

/// Declares the steps and capabilities of a [`Transaction`].
///
/// Step methods look the adapter up when the step is declared, so a
/// transaction that builds never meets an unknown adapter at call time.
///
/// ```ignore
/// let create_user = Transaction::builder("CreateUser")
///     .load_extensions(&[Extension::Validation, Extension::Rescues])
///     .validate_schema(|schema| schema.required("email", Rule::filled(FieldType::String)))?
///     .merge("user", persist_user)?
///     .tap("notify", send_welcome)?
///     .build();
/// ```
pub struct TransactionBuilder {
    name: String,
    steps: Vec<Step>,
    validator: Option<Arc<dyn Validator>>,
    contract: Arc<ContractConfig>,
    extensions: Vec<Extension>,
    interceptors: InterceptorChain,
    events: Option<Arc<dyn EventSink>>,
    job_queue: Option<Arc<dyn JobQueue>>,
    registry: Arc<StepAdapterRegistry>,
    rescue: RescueConfig,
}

impl TransactionBuilder {
    /// Creates a builder for a transaction called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            validator: None,
            contract: Arc::new(ContractConfig::default()),
            extensions: Vec::new(),
            interceptors: InterceptorChain::new(),
            events: None,
            job_queue: None,
            registry: Arc::clone(&STEP_ADAPTERS),
            rescue: RescueConfig::default(),
        }
    }

    /// Uses a different adapter registry than the global one.
    #[must_use]
    pub fn registry(mut self, registry: Arc<StepAdapterRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Adds a step returning the operation's result as is.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken.
    pub fn step(self, name: impl Into<String>, operation: Arc<dyn Operation>) -> Result<Self, TransactionError> {
        self.add_step(StepDefinition::new("step", name, StepOperation::Call(operation)))
    }

    /// Adds a step run for its side effects only.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken.
    pub fn tap(self, name: impl Into<String>, operation: Arc<dyn Operation>) -> Result<Self, TransactionError> {
        self.add_step(StepDefinition::new("tap", name, StepOperation::Call(operation)))
    }

    /// Adds a step whose output is merged into the context.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken.
    pub fn merge(self, name: impl Into<String>, operation: Arc<dyn Operation>) -> Result<Self, TransactionError> {
        self.add_step(StepDefinition::new("merge", name, StepOperation::Call(operation)))
    }

    /// Adds a merge step storing its output under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken.
    pub fn merge_as(
        self,
        name: impl Into<String>,
        key: impl Into<String>,
        operation: Arc<dyn Operation>,
    ) -> Result<Self, TransactionError> {
        self.add_step(StepDefinition::new("merge", name, StepOperation::Call(operation)).with_as(key))
    }

    /// Adds a validation step whose validator is produced per call.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken.
    pub fn valid(self, name: impl Into<String>, source: Arc<dyn ValidatorSource>) -> Result<Self, TransactionError> {
        self.add_step(StepDefinition::new("valid", name, StepOperation::Validator(source)))
    }

    /// Adds a validation step for a fixed validator.
    ///
    /// The step is named after the validator, or `validate`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken.
    pub fn valid_with(self, validator: Arc<dyn Validator>) -> Result<Self, TransactionError> {
        let name = validator.name().unwrap_or(VALIDATE_STEP).to_string();
        self.valid(name, Arc::new(StaticValidator::new(validator)))
    }

    /// Invokes another transaction or operation and merges its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is unnamed or the name is taken.
    pub fn use_step(self, target: Arc<dyn Operation>) -> Result<Self, TransactionError> {
        self.nested(NestedStep::using(target))
    }

    /// Like [`Self::use_step`], but only when the target's validator
    /// accepts the input.
    ///
    /// # Errors
    ///
    /// Returns an error if the target has no validator, is unnamed, or the
    /// name is taken.
    pub fn maybe_step(self, target: Arc<dyn Operation>) -> Result<Self, TransactionError> {
        self.nested(NestedStep::using(target).maybe())
    }

    /// Adds a configured `use`/`maybe` step.
    ///
    /// # Errors
    ///
    /// See [`NestedStep::into_definition`].
    pub fn nested(self, step: NestedStep) -> Result<Self, TransactionError> {
        self.add_step(step.into_definition()?)
    }

    /// Adds a step that enqueues a job.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken.
    pub fn dispatch(self, step: DispatchStep) -> Result<Self, TransactionError> {
        self.add_step(step.into_definition())
    }

    /// Adds a step definition.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::UnknownAdapter`] if the adapter is not
    /// registered, and [`TransactionError::DuplicateStep`] if the name is
    /// taken.
    pub fn add_step(mut self, definition: StepDefinition) -> Result<Self, TransactionError> {
        let step = self.bind(definition)?;
        self.steps.push(step);
        Ok(self)
    }

    fn bind(&self, definition: StepDefinition) -> Result<Step, TransactionError> {
        let adapter = self.registry.lookup(definition.adapter())?;
        if self.steps.iter().any(|s| s.definition.name() == definition.name()) {
            return Err(TransactionError::DuplicateStep(definition.name().to_string()));
        }
        debug!(
            transaction = %self.name,
            step = %definition.name(),
            adapter = %definition.adapter(),
            "Step declared"
        );
        Ok(Step { definition, adapter })
    }

    /// Loads extensions. Loading an extension twice has no effect.
    #[must_use]
    pub fn load_extensions(mut self, extensions: &[Extension]) -> Self {
        for extension in extensions {
            if !self.extensions.contains(extension) {
                self.extensions.push(*extension);
            }
        }
        self
    }

    fn require(&self, extension: Extension) -> Result<(), TransactionError> {
        if self.extensions.contains(&extension) {
            Ok(())
        } else {
            Err(TransactionError::ExtensionNotLoaded(extension))
        }
    }

    /// Binds the transaction validator and inserts the `validate` step
    /// before every other step.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::ExtensionNotLoaded`] without the
    /// `Validation` extension, [`TransactionError::ValidatorAlreadyBound`]
    /// on a second call, and [`TransactionError::DuplicateStep`] if a step
    /// is already called `validate`.
    pub fn validate(mut self, validator: Arc<dyn Validator>) -> Result<Self, TransactionError> {
        self.require(Extension::Validation)?;
        if self.validator.is_some() {
            return Err(TransactionError::ValidatorAlreadyBound(self.name.clone()));
        }

        let source: Arc<dyn ValidatorSource> = Arc::new(StaticValidator::new(Arc::clone(&validator)));
        let step = self.bind(StepDefinition::new("valid", VALIDATE_STEP, StepOperation::Validator(source)))?;
        self.steps.insert(0, step);
        self.validator = Some(validator);
        Ok(self)
    }

    /// Defines the transaction validator inline.
    ///
    /// The schema starts from the contract set by
    /// [`Self::validation_contract`].
    ///
    /// # Errors
    ///
    /// See [`Self::validate`].
    pub fn validate_schema<F>(self, define: F) -> Result<Self, TransactionError>
    where
        F: FnOnce(Schema) -> Schema,
    {
        let schema = define(Schema::with_contract(Arc::clone(&self.contract)).named(self.name.clone()));
        self.validate(Arc::new(schema))
    }

    /// Sets the contract configuration used by [`Self::validate_schema`].
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::ExtensionNotLoaded`] without the
    /// `Validation` extension.
    pub fn validation_contract(mut self, config: ContractConfig) -> Result<Self, TransactionError> {
        self.require(Extension::Validation)?;
        self.contract = Arc::new(config);
        Ok(self)
    }

    /// Sets the queue `perform_later` enqueues on.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::ExtensionNotLoaded`] without the
    /// `PerformLater` extension.
    pub fn transaction_job(mut self, queue: Arc<dyn JobQueue>) -> Result<Self, TransactionError> {
        self.require(Extension::PerformLater)?;
        self.job_queue = Some(queue);
        Ok(self)
    }

    /// Adds a step interceptor.
    #[must_use]
    pub fn interceptor(mut self, interceptor: Arc<dyn StepInterceptor>) -> Self {
        self.interceptors.add(interceptor);
        self
    }

    /// Publishes events to `sink` instead of the global sink.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Applies a configuration: extensions, rescue settings and event
    /// logging.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Config`] for an unknown event level.
    pub fn with_config(mut self, config: &StepflowConfig) -> Result<Self, TransactionError> {
        self = self.load_extensions(&config.extensions);
        self.rescue = config.rescue.clone();
        if config.events.log_events {
            let level = config.events.level()?;
            self.events = Some(Arc::new(LoggingEventSink::new(level)));
        }
        Ok(self)
    }

    /// Finishes the declaration.
    #[must_use]
    pub fn build(mut self) -> Transaction {
        if self.extensions.contains(&Extension::Rescues) {
            let mut rescue = RescueInterceptor::new().with_notify(self.rescue.notify);
            if let Some(message) = self.rescue.message.take() {
                rescue = rescue.with_message(message);
            }
            self.interceptors.add(Arc::new(rescue));
        }

        Transaction {
            name: self.name,
            steps: self.steps,
            validator: self.validator,
            extensions: self.extensions,
            interceptors: self.interceptors,
            events: self.events,
            job_queue: self.job_queue,
        }
    }
}

impl std::fmt::Debug for TransactionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionBuilder")
            .field("name", &self.name)
            .field(
                "steps",
                &self.steps.iter().map(|s| s.definition.name()).collect::<Vec<_>>(),
            )
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StepResult;
    use crate::operations::operation;
    use crate::validation::{FieldType, Rule};

    fn noop() -> Arc<dyn Operation> {
        operation(|args| Ok(StepResult::Success(args.into_value())))
    }

    #[test]
    fn test_validate_is_inserted_first() {
        let txn = Transaction::builder("CreateUser")
            .load_extensions(&[Extension::Validation])
            .merge("persist", noop())
            .unwrap()
            .validate_schema(|schema| schema.required("name", Rule::filled(FieldType::String)))
            .unwrap()
            .build();

        assert_eq!(txn.step_names(), vec!["validate", "persist"]);
        assert!(txn.validator().is_some());
    }

    #[test]
    fn test_validate_requires_extension() {
        let err = Transaction::builder("CreateUser")
            .validate_schema(|schema| schema)
            .unwrap_err();
        assert!(matches!(err, TransactionError::ExtensionNotLoaded(Extension::Validation)));
    }

    #[test]
    fn test_second_validator_is_rejected() {
        let err = Transaction::builder("CreateUser")
            .load_extensions(&[Extension::Validation])
            .validate_schema(|schema| schema)
            .unwrap()
            .validate_schema(|schema| schema)
            .unwrap_err();
        assert!(matches!(err, TransactionError::ValidatorAlreadyBound(_)));
    }

    #[test]
    fn test_duplicate_and_unknown_steps() {
        let err = Transaction::builder("CreateUser")
            .step("persist", noop())
            .unwrap()
            .tap("persist", noop())
            .unwrap_err();
        assert!(matches!(err, TransactionError::DuplicateStep(ref name) if name == "persist"));

        let definition = StepDefinition::new("retry", "persist", StepOperation::Call(noop()));
        let err = Transaction::builder("CreateUser").add_step(definition).unwrap_err();
        assert!(matches!(err, TransactionError::UnknownAdapter(ref key) if key == "retry"));
    }

    #[test]
    fn test_custom_registry() {
        let registry = Arc::new(StepAdapterRegistry::new());
        let err = Transaction::builder("Empty")
            .registry(registry)
            .step("anything", noop())
            .unwrap_err();
        assert!(matches!(err, TransactionError::UnknownAdapter(_)));
    }

    #[test]
    fn test_valid_with_names_step() {
        let named = Schema::new().named("check_email").required("email", Rule::filled(FieldType::String));
        let txn = Transaction::builder("Signup")
            .valid_with(Arc::new(named))
            .unwrap()
            .valid_with(Arc::new(Schema::new()))
            .unwrap()
            .build();
        assert_eq!(txn.step_names(), vec!["check_email", "validate"]);
    }

    #[test]
    fn test_with_config() {
        let config = StepflowConfig::from_json_str(
            r#"{"extensions": ["validation", "rescues"], "events": {"log_events": true}}"#,
        )
        .unwrap();
        let txn = Transaction::builder("Configured")
            .with_config(&config)
            .unwrap()
            .step("a", noop())
            .unwrap()
            .build();

        assert!(txn.has_extension(Extension::Rescues));
        assert!(!txn.has_extension(Extension::PerformLater));
        assert!(format!("{txn:?}").contains("interceptors: 1"));
    }
}
