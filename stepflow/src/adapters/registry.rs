//! Process-wide registry of step adapters.

use super::{Merge, PassThrough, StepAdapter, Tap, Valid};
use crate::errors::TransactionError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Maps adapter keys to adapters.
///
/// Registration is first-wins: once a key is taken, later registrations
/// under the same key are ignored. There is no removal.
#[derive(Default)]
pub struct StepAdapterRegistry {
    adapters: RwLock<HashMap<String, Arc<dyn StepAdapter>>>,
}

impl StepAdapterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the default adapters.
    #[must_use]
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        register_defaults(&registry);
        registry
    }

    /// Registers an adapter unless the key is already taken.
    ///
    /// Returns `true` if the adapter was stored.
    pub fn register(&self, key: impl Into<String>, adapter: Arc<dyn StepAdapter>) -> bool {
        let key = key.into();
        let mut adapters = self.adapters.write();
        if adapters.contains_key(&key) {
            debug!(adapter = %key, "Step adapter already registered, keeping existing");
            return false;
        }
        adapters.insert(key, adapter);
        true
    }

    /// Looks up an adapter.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::UnknownAdapter`] if nothing is registered
    /// under the key.
    pub fn lookup(&self, key: &str) -> Result<Arc<dyn StepAdapter>, TransactionError> {
        self.adapters
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| TransactionError::UnknownAdapter(key.to_string()))
    }

    /// Returns true if the key is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.adapters.read().contains_key(key)
    }

    /// Returns the registered keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.adapters.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Returns the number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.read().is_empty()
    }
}

impl std::fmt::Debug for StepAdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepAdapterRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Registers the `step`, `tap`, `merge` and `valid` adapters.
///
/// Safe to call repeatedly; existing registrations are kept.
pub fn register_defaults(registry: &StepAdapterRegistry) {
    let defaults: [Arc<dyn StepAdapter>; 4] = [
        Arc::new(PassThrough),
        Arc::new(Tap),
        Arc::new(Merge),
        Arc::new(Valid),
    ];
    for adapter in defaults {
        registry.register(adapter.key(), adapter);
    }
}

/// Global adapter registry, populated with the defaults on first access.
pub static STEP_ADAPTERS: LazyLock<Arc<StepAdapterRegistry>> =
    LazyLock::new(|| Arc::new(StepAdapterRegistry::with_defaults()));

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{StepArgs, StepOptions, StepResult};
    use crate::operations::{operation, StepOperation};
    use async_trait::async_trait;
    use serde_json::json;

    #[derive(Debug)]
    struct Constant;

    #[async_trait]
    impl StepAdapter for Constant {
        fn key(&self) -> &'static str {
            "tap"
        }

        async fn call(
            &self,
            _operation: &StepOperation,
            _options: &StepOptions,
            _args: StepArgs,
        ) -> Result<StepResult, TransactionError> {
            Ok(StepResult::success(json!("constant")))
        }
    }

    #[test]
    fn test_defaults_registered() {
        let registry = StepAdapterRegistry::with_defaults();
        assert_eq!(registry.keys(), vec!["merge", "step", "tap", "valid"]);
    }

    #[test]
    fn test_global_registry_has_defaults() {
        assert!(STEP_ADAPTERS.contains("merge"));
        assert!(STEP_ADAPTERS.lookup("valid").is_ok());
    }

    #[tokio::test]
    async fn test_first_registration_wins() {
        let registry = StepAdapterRegistry::with_defaults();
        assert!(!registry.register("tap", Arc::new(Constant)));
        register_defaults(&registry);
        assert_eq!(registry.len(), 4);

        let adapter = registry.lookup("tap").unwrap();
        let op = StepOperation::Call(operation(|_| Ok(StepResult::success(json!("out")))));
        let result = adapter
            .call(&op, &StepOptions::new("t"), StepArgs::single(json!({"a": 1})))
            .await
            .unwrap();
        assert_eq!(result, StepResult::success(json!({"a": 1})));
    }

    #[test]
    fn test_unknown_adapter() {
        let registry = StepAdapterRegistry::new();
        assert!(registry.is_empty());
        let err = registry.lookup("retry").unwrap_err();
        assert_eq!(err.to_string(), "Unknown step adapter: retry");
    }
}
