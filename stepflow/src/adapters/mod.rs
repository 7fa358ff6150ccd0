//! Step adapters and their registry.
//!
//! An adapter turns the output of a step's operation into a
//! [`StepResult`] and decides how that output affects the context handed
//! to the next step. Adapters are looked up by key when a step is declared:
//!
//! - `step` ([`PassThrough`]): the operation's result as is
//! - `tap` ([`Tap`]): run for side effects, pass the input through
//! - `merge` ([`Merge`]): merge the output into the keyword input
//! - `valid` ([`Valid`]): run a validator against the keyword input

mod merge;
mod pass_through;
mod registry;
mod tap;
mod valid;

pub use merge::Merge;
pub use pass_through::PassThrough;
pub use registry::{register_defaults, StepAdapterRegistry, STEP_ADAPTERS};
pub use tap::Tap;
pub use valid::Valid;

use crate::core::{StepArgs, StepOptions, StepResult};
use crate::errors::TransactionError;
use crate::operations::StepOperation;
use async_trait::async_trait;

/// Converts an operation's output into a step result.
#[async_trait]
pub trait StepAdapter: Send + Sync {
    /// The key the adapter is registered under.
    fn key(&self) -> &'static str;

    /// Runs the operation for one step.
    async fn call(
        &self,
        operation: &StepOperation,
        options: &StepOptions,
        args: StepArgs,
    ) -> Result<StepResult, TransactionError>;
}

impl std::fmt::Debug for dyn StepAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StepAdapter").field(&self.key()).finish()
    }
}
