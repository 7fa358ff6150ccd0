//! A small keyword schema engine.
//!
//! Schemas declare required and optional keys, each with a [`Rule`]:
//!
//! ```rust,ignore
//! let schema = Schema::new()
//!     .required("name", Rule::filled(FieldType::String))
//!     .optional("email", Rule::maybe(FieldType::String));
//!
//! let result = schema.call(&input);
//! ```
//!
//! Only declared keys are kept in the output. In params mode (the default)
//! string input is coerced to the declared scalar type and empty strings
//! become `null`.

use super::{ContractConfig, ValidationResult, Validator};
use crate::core::PipelineContext;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Number, Value};
use std::fmt;
use std::sync::Arc;

/// The expected type of a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Anything, including `null`.
    Any,
    /// A string.
    String,
    /// An integer.
    Integer,
    /// A floating point or integer number.
    Float,
    /// A boolean.
    Bool,
    /// A mapping.
    Hash,
    /// An array.
    Array,
    /// A named type registered in the contract's type container.
    Custom(String),
}

impl FieldType {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Any | Self::Custom(_) => true,
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Bool => value.is_boolean(),
            Self::Hash => value.is_object(),
            Self::Array => value.is_array(),
        }
    }

    fn type_message(&self) -> String {
        match self {
            Self::Any => "must be present".to_string(),
            Self::String => "must be a string".to_string(),
            Self::Integer => "must be an integer".to_string(),
            Self::Float => "must be a float".to_string(),
            Self::Bool => "must be boolean".to_string(),
            Self::Hash => "must be a hash".to_string(),
            Self::Array => "must be an array".to_string(),
            Self::Custom(name) => format!("must be {name}"),
        }
    }

    fn coerce(&self, value: Value) -> Value {
        let Value::String(raw) = &value else {
            return value;
        };
        if raw.is_empty() {
            return Value::Null;
        }
        match self {
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map_or(value, |n| Value::Number(n.into())),
            Self::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map_or(value, Value::Number),
            Self::Bool => match raw.as_str() {
                "true" | "1" | "on" => Value::Bool(true),
                "false" | "0" | "off" => Value::Bool(false),
                _ => value,
            },
            _ => value,
        }
    }
}

/// An extra check applied after the type check.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// String must match the pattern.
    Format(Regex),
    /// String, array or mapping must have at least this many elements.
    MinSize(usize),
    /// String, array or mapping must have at most this many elements.
    MaxSize(usize),
    /// Value must be one of the listed values.
    Included(Vec<Value>),
}

impl Predicate {
    fn check(&self, value: &Value) -> Option<String> {
        match self {
            Self::Format(pattern) => match value {
                Value::String(s) if pattern.is_match(s) => None,
                _ => Some("is in invalid format".to_string()),
            },
            Self::MinSize(min) => match size_of(value) {
                Some(size) if size < *min => Some(format!("size cannot be less than {min}")),
                _ => None,
            },
            Self::MaxSize(max) => match size_of(value) {
                Some(size) if size > *max => Some(format!("size cannot be greater than {max}")),
                _ => None,
            },
            Self::Included(allowed) => {
                if allowed.contains(value) {
                    None
                } else {
                    let list: Vec<String> = allowed.iter().map(Value::to_string).collect();
                    Some(format!("must be one of: {}", list.join(", ")))
                }
            }
        }
    }
}

fn size_of(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        Value::Object(map) => Some(map.len()),
        _ => None,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// How a present value is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Must be non-blank and of the type.
    Filled,
    /// May be `null`; otherwise must be of the type.
    Maybe,
    /// Must be of the type.
    Value,
}

/// The rule for a single key.
#[derive(Debug, Clone)]
pub struct Rule {
    kind: RuleKind,
    field_type: FieldType,
    predicates: Vec<Predicate>,
}

impl Rule {
    /// Value must be filled and of the type.
    #[must_use]
    pub fn filled(field_type: FieldType) -> Self {
        Self::new(RuleKind::Filled, field_type)
    }

    /// Value may be `null`, otherwise of the type.
    #[must_use]
    pub fn maybe(field_type: FieldType) -> Self {
        Self::new(RuleKind::Maybe, field_type)
    }

    /// Value must be of the type.
    #[must_use]
    pub fn value(field_type: FieldType) -> Self {
        Self::new(RuleKind::Value, field_type)
    }

    fn new(kind: RuleKind, field_type: FieldType) -> Self {
        Self {
            kind,
            field_type,
            predicates: Vec::new(),
        }
    }

    /// Adds a predicate.
    #[must_use]
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Returns the rule kind.
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Returns the field type.
    #[must_use]
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }
}

#[derive(Debug, Clone)]
struct KeySpec {
    required: bool,
    rule: Rule,
}

/// A keyword schema.
#[derive(Clone, Default)]
pub struct Schema {
    name: Option<String>,
    keys: IndexMap<String, KeySpec>,
    contract: Arc<ContractConfig>,
}

impl Schema {
    /// Creates an empty schema with the default contract configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty schema on top of a contract configuration.
    #[must_use]
    pub fn with_contract(contract: Arc<ContractConfig>) -> Self {
        Self {
            name: None,
            keys: IndexMap::new(),
            contract,
        }
    }

    /// Names the schema.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declares a required key.
    #[must_use]
    pub fn required(mut self, key: impl Into<String>, rule: Rule) -> Self {
        self.keys.insert(key.into(), KeySpec { required: true, rule });
        self
    }

    /// Declares an optional key.
    #[must_use]
    pub fn optional(mut self, key: impl Into<String>, rule: Rule) -> Self {
        self.keys.insert(key.into(), KeySpec { required: false, rule });
        self
    }

    /// Returns the declared keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.keys.keys()
    }

    fn check_value(&self, rule: &Rule, value: &Value) -> Option<String> {
        let mut predicates: Vec<&Predicate> = Vec::new();
        let base = match &rule.field_type {
            FieldType::Custom(name) => match self.contract.types.get(name) {
                Some(definition) => {
                    predicates.extend(definition.predicates.iter());
                    definition.base.clone()
                }
                None => return Some(format!("uses unregistered type '{name}'")),
            },
            other => other.clone(),
        };

        match rule.kind {
            RuleKind::Filled if is_blank(value) => return Some("must be filled".to_string()),
            RuleKind::Maybe if value.is_null() => return None,
            _ => {}
        }

        if !base.matches(value) {
            return Some(rule.field_type.type_message());
        }

        predicates.extend(rule.predicates.iter());
        predicates.into_iter().find_map(|p| p.check(value))
    }

    fn coerce(&self, rule: &Rule, value: Value) -> Value {
        if !self.contract.coerce_params {
            return value;
        }
        match &rule.field_type {
            FieldType::Custom(name) => match self.contract.types.get(name) {
                Some(definition) => definition.base.coerce(value),
                None => value,
            },
            other => other.coerce(value),
        }
    }
}

impl Validator for Schema {
    fn call(&self, input: &PipelineContext) -> ValidationResult {
        let mut output = PipelineContext::new();
        let mut result_errors: IndexMap<String, Vec<String>> = IndexMap::new();

        for (key, spec) in &self.keys {
            let Some(raw) = input.get(key) else {
                if spec.required {
                    result_errors.entry(key.clone()).or_default().push("is missing".to_string());
                }
                continue;
            };

            let value = self.coerce(&spec.rule, raw.clone());
            if let Some(message) = self.check_value(&spec.rule, &value) {
                result_errors.entry(key.clone()).or_default().push(message);
            }
            output.insert(key.clone(), value);
        }

        ValidationResult::new(output, result_errors)
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("keys", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}
