//! Job queue seam and an in-memory queue.

use super::{EnqueueOptions, JobAck, JobDescriptor};
use crate::errors::JobError;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

/// Accepts jobs for later execution.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueues a job.
    async fn enqueue(&self, job: JobDescriptor, options: EnqueueOptions) -> Result<JobAck, JobError>;
}

/// Queue that keeps jobs in memory. Useful for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryJobQueue {
    jobs: Mutex<Vec<(JobDescriptor, EnqueueOptions)>>,
}

impl InMemoryJobQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the enqueued jobs.
    #[must_use]
    pub fn jobs(&self) -> Vec<(JobDescriptor, EnqueueOptions)> {
        self.jobs.lock().clone()
    }

    /// Returns the number of enqueued jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Returns true if nothing has been enqueued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    /// Removes and returns all jobs.
    pub fn drain(&self) -> Vec<(JobDescriptor, EnqueueOptions)> {
        std::mem::take(&mut *self.jobs.lock())
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: JobDescriptor, options: EnqueueOptions) -> Result<JobAck, JobError> {
        let ack = JobAck::now(&job.target_name, options)?;
        debug!(job = %job.target_name, job_id = %ack.job_id, "Job enqueued");
        self.jobs.lock().push((job, options));
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_in_memory_queue_records_jobs() {
        let queue = InMemoryJobQueue::new();
        let options = EnqueueOptions::new().with_delay(Duration::from_secs(5));
        let ack = queue
            .enqueue(JobDescriptor::new("cleanup", vec![json!({"id": 1})]), options)
            .await
            .unwrap();

        assert_eq!(ack.target_name, "cleanup");
        assert_eq!(queue.len(), 1);
        let (job, recorded) = queue.drain().remove(0);
        assert_eq!(job.args, vec![json!({"id": 1})]);
        assert_eq!(recorded.delay, Some(Duration::from_secs(5)));
        assert!(queue.is_empty());
    }
}
