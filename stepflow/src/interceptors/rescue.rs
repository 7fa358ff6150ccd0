//! Conversion of raised persistence errors into step failures.

use super::{StepContext, StepInterceptor};
use crate::core::{RescuedFailure, StepResult};
use crate::errors::TransactionError;
use crate::events::STEP_FAILED;
use async_trait::async_trait;
use serde_json::json;
use tracing::info;

/// Turns `RecordInvalid`, `RecordNotFound` and `RecordNotUnique` errors
/// raised by a step into a `Failure`.
///
/// The failure message is the step's `message` option, else the
/// interceptor's default, else the original error. Every other error is
/// left to propagate.
#[derive(Debug, Clone, Default)]
pub struct RescueInterceptor {
    message: Option<String>,
    notify: bool,
}

impl RescueInterceptor {
    /// Creates an interceptor that publishes `step_failed` on rescue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            message: None,
            notify: true,
        }
    }

    /// Sets the default failure message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Controls whether `step_failed` is published on rescue.
    #[must_use]
    pub fn with_notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }
}

#[async_trait]
impl StepInterceptor for RescueInterceptor {
    fn priority(&self) -> i32 {
        100
    }

    async fn on_error(&self, ctx: &StepContext, error: &TransactionError) -> Option<StepResult> {
        let persistence = error.rescuable()?;

        let message = ctx.options().message.clone().or_else(|| self.message.clone());
        let failure = RescuedFailure::new(ctx.step_name(), persistence.clone(), message);

        info!(
            transaction = %ctx.transaction(),
            step = %ctx.step_name(),
            error = %persistence,
            "Rescued persistence error"
        );

        if self.notify {
            ctx.emit(
                STEP_FAILED,
                json!({
                    "step_name": ctx.step_name(),
                    "args": ctx.args().to_value(),
                    "value": failure.value(),
                }),
            );
        }

        Some(StepResult::failure(failure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Failure, StepArgs, StepOptions};
    use crate::errors::PersistenceError;
    use crate::events::CollectingEventSink;
    use std::sync::Arc;

    fn ctx(options: StepOptions, sink: Arc<CollectingEventSink>) -> StepContext {
        StepContext::new("CreateUser", options, StepArgs::single(json!({"email": "a@b.c"})), sink)
    }

    #[tokio::test]
    async fn test_rescues_persistence_errors() {
        let sink = Arc::new(CollectingEventSink::new());
        let error: TransactionError = PersistenceError::record_not_found("User", "id", "1").into();

        let result = RescueInterceptor::new()
            .on_error(&ctx(StepOptions::new("find"), sink.clone()), &error)
            .await
            .unwrap();

        let Some(Failure::Rescued(rescued)) = result.failure_detail() else {
            panic!("expected rescued failure, got {result:?}");
        };
        assert_eq!(rescued.step_name, "find");
        assert_eq!(rescued.message(), "Couldn't find User with 'id'=1");

        let payloads = sink.payloads(STEP_FAILED);
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0]["step_name"], "find");
        assert_eq!(payloads[0]["args"], json!({"email": "a@b.c"}));
    }

    #[tokio::test]
    async fn test_message_precedence() {
        let sink = Arc::new(CollectingEventSink::new());
        let error: TransactionError = PersistenceError::record_not_unique("User", "email").into();
        let interceptor = RescueInterceptor::new().with_message("Could not save");

        let from_default = interceptor
            .on_error(&ctx(StepOptions::new("save"), sink.clone()), &error)
            .await
            .unwrap();
        assert_eq!(from_default, StepResult::failure(RescuedFailure::new(
            "save",
            PersistenceError::record_not_unique("User", "email"),
            Some("Could not save".to_string()),
        )));

        let from_step = interceptor
            .on_error(&ctx(StepOptions::new("save").with_message("Email taken"), sink), &error)
            .await
            .unwrap();
        assert_eq!(from_step.failure_detail().unwrap().to_value(), json!("Email taken"));
    }

    #[tokio::test]
    async fn test_other_errors_propagate_and_notify_off() {
        let sink = Arc::new(CollectingEventSink::new());
        let interceptor = RescueInterceptor::new().with_notify(false);

        let other = TransactionError::Operation(anyhow::anyhow!("disk full"));
        assert!(interceptor
            .on_error(&ctx(StepOptions::new("save"), sink.clone()), &other)
            .await
            .is_none());

        let invalid: TransactionError =
            PersistenceError::record_invalid("User", vec!["Name can't be blank".to_string()]).into();
        let result = interceptor
            .on_error(&ctx(StepOptions::new("save"), sink.clone()), &invalid)
            .await;
        assert!(result.is_some_and(|r| r.is_failure()));
        assert!(sink.is_empty());
    }
}
