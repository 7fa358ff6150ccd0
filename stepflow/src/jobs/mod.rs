//! Background job plumbing.
//!
//! Steps never run jobs themselves. They describe the work as a
//! [`JobDescriptor`] and hand it to a [`JobQueue`]; what happens afterwards
//! is the queue's business.

mod queue;
mod target;

pub use queue::{InMemoryJobQueue, JobQueue};
pub use target::{AsyncTarget, ConfiguredJob, QueuedJob};

#[cfg(test)]
pub use queue::MockJobQueue;

use crate::errors::JobError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

/// A unit of deferred work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// The name of the job or transaction to run.
    pub target_name: String,
    /// Positional arguments for the job.
    pub args: Vec<Value>,
}

impl JobDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(target_name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            target_name: target_name.into(),
            args,
        }
    }
}

/// Options applied when enqueueing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnqueueOptions {
    /// Run no earlier than this long after enqueueing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<Duration>,
}

impl EnqueueOptions {
    /// Creates options with no delay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Acknowledgement returned by a queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAck {
    /// Queue-assigned job id.
    pub job_id: Uuid,
    /// The job target.
    pub target_name: String,
    /// When the job was accepted.
    pub enqueued_at: DateTime<Utc>,
    /// When the job becomes runnable.
    pub scheduled_at: DateTime<Utc>,
}

impl JobAck {
    /// Creates an acknowledgement for a job accepted now.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::InvalidDelay`] when the delay cannot be added to
    /// the current time.
    pub fn now(target_name: impl Into<String>, options: EnqueueOptions) -> Result<Self, JobError> {
        let target_name = target_name.into();
        let enqueued_at = Utc::now();
        let scheduled_at = match options.delay {
            None => enqueued_at,
            Some(delay) => chrono::Duration::from_std(delay)
                .ok()
                .and_then(|delta| enqueued_at.checked_add_signed(delta))
                .ok_or_else(|| JobError::invalid_delay(&target_name, delay))?,
        };
        Ok(Self {
            job_id: Uuid::new_v4(),
            target_name,
            enqueued_at,
            scheduled_at,
        })
    }

    /// Converts to a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
