//! Transactions: ordered steps run in sequence.
//!
//! This module provides:
//! - [`TransactionBuilder`], which declares steps and loads extensions
//! - [`Transaction`], the immutable step table and its runtime
//! - [`StepDefinition`], a declared step
//! - [`Extension`], the opt-in capabilities

mod builder;
mod definition;
mod extension;


pub use builder::TransactionBuilder;
pub use definition::StepDefinition;
pub use extension::Extension;

use crate::adapters::StepAdapter;
use crate::core::{StepArgs, StepResult};
use crate::errors::TransactionError;
use crate::events::{get_event_sink, EventSink, STEP, STEP_FAILED, STEP_SUCCEEDED};
use crate::interceptors::{InterceptorChain, StepContext};
use crate::jobs::{AsyncTarget, ConfiguredJob, EnqueueOptions, JobDescriptor, JobQueue};
use crate::observability::StepTimer;
use crate::operations::Operation;
use crate::validation::Validator;
use async_trait::async_trait;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// A declared step bound to its adapter.
#[derive(Clone)]
pub(crate) struct Step {
    pub(crate) definition: StepDefinition,
    pub(crate) adapter: Arc<dyn StepAdapter>,
}

/// An ordered sequence of named steps.
///
/// Each step receives the previous step's success value. The first
/// `Failure` halts the transaction and is returned unchanged.
#[derive(Clone)]
pub struct Transaction {
    name: String,
    steps: Vec<Step>,
    validator: Option<Arc<dyn Validator>>,
    extensions: Vec<Extension>,
    interceptors: InterceptorChain,
    events: Option<Arc<dyn EventSink>>,
    job_queue: Option<Arc<dyn JobQueue>>,
}

impl Transaction {
    /// Starts declaring a transaction.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> TransactionBuilder {
        TransactionBuilder::new(name)
    }

    /// The transaction name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The step names, in execution order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.definition.name()).collect()
    }

    /// The validator bound with `validate`, for standalone pre-checks.
    #[must_use]
    pub fn validator(&self) -> Option<Arc<dyn Validator>> {
        self.validator.clone()
    }

    /// Returns true if the extension was loaded.
    #[must_use]
    pub fn has_extension(&self, extension: Extension) -> bool {
        self.extensions.contains(&extension)
    }

    fn event_sink(&self) -> Arc<dyn EventSink> {
        self.events.clone().unwrap_or_else(get_event_sink)
    }

    /// Runs every step in order.
    ///
    /// Returns `Success` with the last step's value, or the first `Failure`.
    /// A transaction without steps returns its input.
    ///
    /// # Errors
    ///
    /// Returns any error a step raised that no interceptor recovered.
    pub async fn call(&self, input: impl Into<StepArgs>) -> Result<StepResult, TransactionError> {
        let sink = self.event_sink();
        let mut args = input.into();
        debug!(transaction = %self.name, steps = self.steps.len(), "Transaction started");

        for step in &self.steps {
            match self.run_step(step, args, &sink).await? {
                StepResult::Success(value) => args = StepArgs::single(value),
                failure @ StepResult::Failure(_) => {
                    debug!(
                        transaction = %self.name,
                        step = %step.definition.name(),
                        "Transaction halted"
                    );
                    return Ok(failure);
                }
            }
        }

        debug!(transaction = %self.name, "Transaction finished");
        Ok(StepResult::Success(args.into_value()))
    }

    async fn run_step(
        &self,
        step: &Step,
        args: StepArgs,
        sink: &Arc<dyn EventSink>,
    ) -> Result<StepResult, TransactionError> {
        let name = step.definition.name();
        let ctx = StepContext::new(
            &self.name,
            step.definition.options().clone(),
            args.clone(),
            Arc::clone(sink),
        );
        sink.emit(STEP, json!({ "step_name": name, "args": args.to_value() }))
            .await;

        let timer = StepTimer::start(name);
        let result = match self.interceptors.run_before(&ctx).await {
            Some(result) => result,
            None => {
                let outcome = step
                    .adapter
                    .call(step.definition.operation(), step.definition.options(), args.clone())
                    .await;
                match outcome {
                    Ok(result) => self.interceptors.run_after(&ctx, result).await,
                    Err(err) => {
                        return match self.interceptors.handle_error(&ctx, &err).await {
                            Some(recovered) => {
                                debug!(transaction = %self.name, step = %name, error = %err, "Step error recovered");
                                Ok(recovered)
                            }
                            None => {
                                error!(transaction = %self.name, step = %name, error = %err, "Step raised");
                                Err(err)
                            }
                        };
                    }
                }
            }
        };
        let duration_ms = timer.finish();

        match &result {
            StepResult::Success(value) => {
                debug!(transaction = %self.name, step = %name, duration_ms, "Step succeeded");
                sink.emit(
                    STEP_SUCCEEDED,
                    json!({ "step_name": name, "args": args.to_value(), "value": value }),
                )
                .await;
            }
            StepResult::Failure(failure) => {
                info!(transaction = %self.name, step = %name, duration_ms, "Step failed");
                sink.emit(
                    STEP_FAILED,
                    json!({ "step_name": name, "args": args.to_value(), "value": failure.to_value() }),
                )
                .await;
            }
        }

        Ok(result)
    }

    /// Enqueues the whole transaction on its job queue.
    ///
    /// Input is validated first when a validator is bound; a rejected input
    /// is returned as a `Failure` and nothing is enqueued.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::ExtensionNotLoaded`] without the
    /// `PerformLater` extension, [`TransactionError::NoJobQueue`] without a
    /// queue, and queue errors.
    pub async fn perform_later(&self, args: impl Into<StepArgs>) -> Result<StepResult, TransactionError> {
        self.enqueue(args.into(), EnqueueOptions::default()).await
    }

    /// Binds enqueue options for a later `perform_later`.
    #[must_use]
    pub fn set(&self, options: EnqueueOptions) -> ConfiguredJob<'_> {
        ConfiguredJob::new(self, options)
    }

    async fn enqueue(&self, args: StepArgs, options: EnqueueOptions) -> Result<StepResult, TransactionError> {
        if !self.has_extension(Extension::PerformLater) {
            return Err(TransactionError::ExtensionNotLoaded(Extension::PerformLater));
        }
        let queue = self
            .job_queue
            .as_ref()
            .ok_or_else(|| TransactionError::NoJobQueue(self.name.clone()))?;

        let args = match &self.validator {
            Some(validator) => {
                let context = args.to_context("perform_later", &self.name)?;
                let result = validator.call(&context);
                if result.is_failure() {
                    return Ok(StepResult::failure(result));
                }
                StepArgs::from(result.to_context())
            }
            None => args,
        };

        let ack = queue
            .enqueue(JobDescriptor::new(&self.name, args.values().to_vec()), options)
            .await?;
        info!(transaction = %self.name, job_id = %ack.job_id, "Transaction enqueued");
        Ok(StepResult::Success(ack.to_value()))
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("name", &self.name)
            .field("steps", &self.step_names())
            .field("extensions", &self.extensions)
            .field("has_validator", &self.validator.is_some())
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Operation for Transaction {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn validator(&self) -> Option<Arc<dyn Validator>> {
        self.validator.clone()
    }

    async fn call(&self, args: StepArgs) -> Result<StepResult, TransactionError> {
        Transaction::call(self, args).await
    }
}

#[async_trait]
impl AsyncTarget for Transaction {
    fn name(&self) -> &str {
        &self.name
    }

    fn validator(&self) -> Option<Arc<dyn Validator>> {
        self.validator.clone()
    }

    async fn perform_later(
        &self,
        args: StepArgs,
        options: EnqueueOptions,
    ) -> Result<StepResult, TransactionError> {
        self.enqueue(args, options).await
    }
}
