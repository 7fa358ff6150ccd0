//! Core domain model types for stepflow.
//!
//! This module contains the fundamental types used throughout the crate:
//! - The Success/Failure step result and its failure details
//! - The ordered pipeline context
//! - Positional step arguments and per-step options

mod args;
mod context;
mod options;
mod result;

pub use args::StepArgs;
pub use context::PipelineContext;
pub use options::StepOptions;
pub use result::{Failure, RescuedFailure, StepResult};
