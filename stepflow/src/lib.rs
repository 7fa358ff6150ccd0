//! # Stepflow
//!
//! Composable step adapters and step generators for sequential
//! transactions.
//!
//! A transaction is an ordered list of named steps. Each step wraps an
//! operation, and an adapter decides how the operation's result affects the
//! value handed to the next step:
//!
//! - **Adapters**: `step`, `tap`, `merge` and `valid`, looked up by key in a
//!   process-wide registry
//! - **Nested steps**: `use` or `maybe` another transaction, resolved up
//!   front or late through a [`Container`]
//! - **Validation gate**: a bound validator that runs as the first step and
//!   guards `maybe` and background dispatch
//! - **Background dispatch**: enqueue a job from a step without ever failing
//!   the transaction
//! - **Rescue**: turn persistence errors into step failures
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepflow::prelude::*;
//!
//! let create_user = Transaction::builder("CreateUser")
//!     .load_extensions(&[Extension::Validation, Extension::Rescues])
//!     .validate_schema(|schema| schema.required("email", Rule::filled(FieldType::String)))?
//!     .merge_as("persist", "user", persist_user)?
//!     .dispatch(DispatchStep::new(welcome_email))?
//!     .build();
//!
//! let result = create_user.call(json!({"email": "jane@doe.com"})).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod adapters;
pub mod config;
pub mod container;
pub mod core;
pub mod errors;
pub mod events;
pub mod interceptors;
pub mod jobs;
pub mod observability;
pub mod operations;
pub mod steps;
pub mod testing;
pub mod transaction;
pub mod utils;
pub mod validation;

pub use container::Container;
pub use transaction::{Transaction, TransactionBuilder};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::{StepAdapter, StepAdapterRegistry, STEP_ADAPTERS};
    pub use crate::config::StepflowConfig;
    pub use crate::container::Container;
    pub use crate::core::{Failure, PipelineContext, StepArgs, StepOptions, StepResult};
    pub use crate::errors::{JobError, PersistenceError, TransactionError};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::interceptors::{RescueInterceptor, StepContext, StepInterceptor};
    pub use crate::jobs::{
        AsyncTarget, EnqueueOptions, InMemoryJobQueue, JobDescriptor, JobQueue, QueuedJob,
    };
    pub use crate::operations::{operation, AsyncFnOperation, FnOperation, Operation};
    pub use crate::steps::{DispatchStep, NestedStep};
    pub use crate::transaction::{Extension, StepDefinition, Transaction, TransactionBuilder};
    pub use crate::validation::{
        ContractConfig, FieldType, Predicate, Rule, Schema, ValidationResult, Validator,
    };
}
