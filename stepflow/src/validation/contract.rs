//! Contract configuration shared by inline schemas.
//!
//! A transaction family can set one contract configuration so that every
//! schema defined through `validate_schema` sees the same custom types and
//! coercion mode.

use super::{FieldType, Predicate};
use std::collections::HashMap;

/// A named type: a base type plus extra predicates.
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub(crate) base: FieldType,
    pub(crate) predicates: Vec<Predicate>,
}

impl TypeDefinition {
    /// Creates a type definition from a base type.
    #[must_use]
    pub fn new(base: FieldType) -> Self {
        Self {
            base,
            predicates: Vec::new(),
        }
    }

    /// Constrains the type with a predicate.
    #[must_use]
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }
}

/// Registry of named types.
#[derive(Debug, Clone, Default)]
pub struct TypeContainer {
    types: HashMap<String, TypeDefinition>,
}

impl TypeContainer {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type under a name, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, definition: TypeDefinition) {
        self.types.insert(name.into(), definition);
    }

    /// Looks up a type.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Configuration applied to every schema built from it.
#[derive(Debug, Clone)]
pub struct ContractConfig {
    /// Custom named types.
    pub types: TypeContainer,
    /// Whether string input is coerced to declared scalar types.
    pub coerce_params: bool,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            types: TypeContainer::new(),
            coerce_params: true,
        }
    }
}

impl ContractConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a custom type.
    #[must_use]
    pub fn with_type(mut self, name: impl Into<String>, definition: TypeDefinition) -> Self {
        self.types.register(name, definition);
        self
    }

    /// Disables params coercion.
    #[must_use]
    pub fn without_coercion(mut self) -> Self {
        self.coerce_params = false;
        self
    }
}
