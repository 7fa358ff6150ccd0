//! Step generators.
//!
//! These builders produce ordinary [`crate::transaction::StepDefinition`]s
//! wired to one of the registered adapters:
//!
//! - [`NestedStep`]: `use`/`maybe` another transaction or operation
//!   (`merge` adapter)
//! - [`DispatchStep`]: enqueue a job (`step` adapter)

mod dispatch;
mod nested;

pub use dispatch::DispatchStep;
pub use nested::{NestedStep, NestedTarget};
