//! Named registry of operations resolved late by nested steps.

use crate::errors::TransactionError;
use crate::operations::Operation;
use dashmap::DashMap;
use std::sync::Arc;

/// A named key → operation registry.
///
/// Nested steps built with [`crate::steps::NestedStep::using_key`] resolve
/// their target here at call time, so registrations made after the
/// transaction is built are still picked up.
pub struct Container {
    name: String,
    entries: DashMap<String, Arc<dyn Operation>>,
}

impl Container {
    /// Creates an empty container.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: DashMap::new(),
        }
    }

    /// The container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers an operation, replacing any previous one under the key.
    pub fn register(&self, key: impl Into<String>, operation: Arc<dyn Operation>) {
        self.entries.insert(key.into(), operation);
    }

    /// Resolves a key.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::UnresolvedKey`] when the key is missing.
    pub fn resolve(&self, key: &str) -> Result<Arc<dyn Operation>, TransactionError> {
        self.entries
            .get(key)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| TransactionError::unresolved_key(&self.name, key))
    }

    /// Returns true if the key is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the registered keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StepResult;
    use crate::operations::operation;
    use serde_json::json;

    #[test]
    fn test_register_and_resolve() {
        let container = Container::new("Container");
        container.register("users.find", operation(|_| Ok(StepResult::success(json!(1)))));

        assert!(container.contains("users.find"));
        assert!(container.resolve("users.find").is_ok());
        assert_eq!(container.keys(), vec!["users.find"]);
    }

    #[test]
    fn test_missing_key() {
        let container = Container::new("Container");
        let err = container.resolve("users.find").unwrap_err();
        assert!(matches!(
            err,
            TransactionError::UnresolvedKey { ref container, ref key }
                if container == "Container" && key == "users.find"
        ));
    }
}
