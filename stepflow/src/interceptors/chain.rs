//! Interceptor chain for ordered middleware execution.

use super::StepContext;
use crate::core::StepResult;
use crate::errors::TransactionError;
use async_trait::async_trait;
use std::sync::Arc;

/// Middleware around every step of a transaction.
#[async_trait]
pub trait StepInterceptor: Send + Sync {
    /// Returns the interceptor's priority (lower = earlier execution).
    fn priority(&self) -> i32 {
        0
    }

    /// Called before the step runs.
    ///
    /// Return `Some(result)` to skip the step and use `result` instead.
    async fn before(&self, _ctx: &StepContext) -> Option<StepResult> {
        None
    }

    /// Called with the step's result. Can observe or replace it.
    async fn after(&self, _ctx: &StepContext, result: StepResult) -> StepResult {
        result
    }

    /// Called when the step raised an error.
    ///
    /// Return `Some(result)` to recover; `None` lets the error propagate.
    async fn on_error(&self, _ctx: &StepContext, _error: &TransactionError) -> Option<StepResult> {
        None
    }
}

/// Interceptors ordered by priority.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn StepInterceptor>>,
}

impl InterceptorChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an interceptor, keeping the chain sorted by priority.
    pub fn add(&mut self, interceptor: Arc<dyn StepInterceptor>) {
        self.interceptors.push(interceptor);
        self.interceptors.sort_by_key(|i| i.priority());
    }

    /// Runs `before` hooks until one short-circuits.
    pub async fn run_before(&self, ctx: &StepContext) -> Option<StepResult> {
        for interceptor in &self.interceptors {
            if let Some(result) = interceptor.before(ctx).await {
                return Some(result);
            }
        }
        None
    }

    /// Runs `after` hooks in reverse order.
    pub async fn run_after(&self, ctx: &StepContext, mut result: StepResult) -> StepResult {
        for interceptor in self.interceptors.iter().rev() {
            result = interceptor.after(ctx, result).await;
        }
        result
    }

    /// Offers an error to each interceptor until one recovers it.
    pub async fn handle_error(&self, ctx: &StepContext, error: &TransactionError) -> Option<StepResult> {
        for interceptor in &self.interceptors {
            if let Some(result) = interceptor.on_error(ctx, error).await {
                return Some(result);
            }
        }
        None
    }

    /// Returns the number of interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns true if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.len())
            .finish()
    }
}
