//! Interceptors (middleware) for step execution.

mod chain;
mod context;
mod rescue;

pub use chain::{InterceptorChain, StepInterceptor};
pub use context::StepContext;
pub use rescue::RescueInterceptor;
