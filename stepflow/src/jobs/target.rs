//! Things that can be scheduled for later execution.

use super::{EnqueueOptions, JobDescriptor, JobQueue};
use crate::core::{StepArgs, StepResult};
use crate::errors::TransactionError;
use crate::validation::Validator;
use async_trait::async_trait;
use std::sync::Arc;

/// A job or transaction that can be enqueued.
#[async_trait]
pub trait AsyncTarget: Send + Sync {
    /// The target name, as recorded on enqueued jobs.
    fn name(&self) -> &str;

    /// The validator input is checked against before enqueueing.
    fn validator(&self) -> Option<Arc<dyn Validator>> {
        None
    }

    /// Enqueues the target with the given arguments.
    ///
    /// Returns the queue acknowledgement as the success value.
    async fn perform_later(
        &self,
        args: StepArgs,
        options: EnqueueOptions,
    ) -> Result<StepResult, TransactionError>;
}

/// A plain job: a name bound to a queue.
#[derive(Clone)]
pub struct QueuedJob {
    name: String,
    queue: Arc<dyn JobQueue>,
    validator: Option<Arc<dyn Validator>>,
}

impl QueuedJob {
    /// Creates a job enqueued on `queue` under `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, queue: Arc<dyn JobQueue>) -> Self {
        Self {
            name: name.into(),
            queue,
            validator: None,
        }
    }

    /// Declares the input contract of the job.
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Pre-binds enqueue options.
    #[must_use]
    pub fn set(&self, options: EnqueueOptions) -> ConfiguredJob<'_> {
        ConfiguredJob::new(self, options)
    }
}

impl std::fmt::Debug for QueuedJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedJob")
            .field("name", &self.name)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

#[async_trait]
impl AsyncTarget for QueuedJob {
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
        let job = JobDescriptor::new(&self.name, args.values().to_vec());
        let ack = self.queue.enqueue(job, options).await?;
        Ok(StepResult::Success(ack.to_value()))
    }
}

/// A target with enqueue options already applied.
#[derive(Clone, Copy)]
pub struct ConfiguredJob<'a> {
    target: &'a dyn AsyncTarget,
    options: EnqueueOptions,
}

impl<'a> ConfiguredJob<'a> {
    /// Binds options to a target.
    #[must_use]
    pub fn new(target: &'a dyn AsyncTarget, options: EnqueueOptions) -> Self {
        Self { target, options }
    }

    /// The bound options.
    #[must_use]
    pub fn options(&self) -> EnqueueOptions {
        self.options
    }

    /// Enqueues the target with the bound options.
    ///
    /// # Errors
    ///
    /// Propagates the target's enqueue errors.
    pub async fn perform_later(&self, args: impl Into<StepArgs>) -> Result<StepResult, TransactionError> {
        self.target.perform_later(args.into(), self.options).await
    }
}

impl std::fmt::Debug for ConfiguredJob<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfiguredJob")
            .field("target", &self.target.name())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::JobError;
    use crate::jobs::{InMemoryJobQueue, MockJobQueue};
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_queued_job_enqueues_args() {
        let queue = Arc::new(InMemoryJobQueue::new());
        let job = QueuedJob::new("ReportJob", queue.clone());

        let result = job
            .perform_later(StepArgs::single(json!({"id": 3})), EnqueueOptions::new())
            .await
            .unwrap();

        assert_eq!(result.value().unwrap()["target_name"], "ReportJob");
        let (descriptor, _) = queue.drain().remove(0);
        assert_eq!(descriptor, JobDescriptor::new("ReportJob", vec![json!({"id": 3})]));
    }

    #[tokio::test]
    async fn test_configured_job_applies_delay() {
        let mut queue = MockJobQueue::new();
        queue
            .expect_enqueue()
            .withf(|job, options| {
                job.target_name == "ReportJob" && options.delay == Some(Duration::from_secs(30))
            })
            .times(1)
            .returning(|job, options| crate::jobs::JobAck::now(job.target_name, options));

        let job = QueuedJob::new("ReportJob", Arc::new(queue));
        let configured = job.set(EnqueueOptions::new().with_delay(Duration::from_secs(30)));
        let result = configured.perform_later(json!({"id": 3})).await.unwrap();
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_enqueue_error_is_raised() {
        let mut queue = MockJobQueue::new();
        queue
            .expect_enqueue()
            .returning(|job, _| Err(JobError::enqueue_failed(job.target_name, "offline")));

        let job = QueuedJob::new("ReportJob", Arc::new(queue));
        let err = job
            .perform_later(StepArgs::empty(), EnqueueOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TransactionError::Job(_)));
    }
}
