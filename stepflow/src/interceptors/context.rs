//! Per-step view handed to interceptors.

use crate::core::{StepArgs, StepOptions};
use crate::events::EventSink;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// What an interceptor knows about the step being run.
#[derive(Clone)]
pub struct StepContext {
    transaction: String,
    options: StepOptions,
    args: StepArgs,
    events: Arc<dyn EventSink>,
}

impl StepContext {
    /// Creates a step context.
    #[must_use]
    pub fn new(
        transaction: impl Into<String>,
        options: StepOptions,
        args: StepArgs,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            transaction: transaction.into(),
            options,
            args,
            events,
        }
    }

    /// The transaction name.
    #[must_use]
    pub fn transaction(&self) -> &str {
        &self.transaction
    }

    /// The step name.
    #[must_use]
    pub fn step_name(&self) -> &str {
        &self.options.step_name
    }

    /// The step options.
    #[must_use]
    pub fn options(&self) -> &StepOptions {
        &self.options
    }

    /// The arguments the step was called with.
    #[must_use]
    pub fn args(&self) -> &StepArgs {
        &self.args
    }

    /// Publishes an event on the transaction's sink.
    pub fn emit(&self, event: &str, payload: Value) {
        self.events.try_emit(event, payload);
    }
}

impl fmt::Debug for StepContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepContext")
            .field("transaction", &self.transaction)
            .field("options", &self.options)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}
