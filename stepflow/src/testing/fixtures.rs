//! Shared fixtures.

use crate::core::PipelineContext;
use crate::validation::{FieldType, Predicate, Rule, Schema};
use regex::Regex;
use serde_json::{json, Value};

/// Requires a filled `name` string and a filled `email` containing `@`.
#[must_use]
pub fn person_schema() -> Schema {
    let email = Regex::new(r"^[^@\s]+@[^@\s]+$").ok();
    let email_rule = match email {
        Some(pattern) => Rule::filled(FieldType::String).with(Predicate::Format(pattern)),
        None => Rule::filled(FieldType::String),
    };
    Schema::new()
        .named("person")
        .required("name", Rule::filled(FieldType::String))
        .required("email", email_rule)
}

/// Input accepted by [`person_schema`].
#[must_use]
pub fn person_input() -> Value {
    json!({ "name": "Jane", "email": "jane@doe.com" })
}

/// Builds a context from a JSON object. Non-objects give an empty context.
#[must_use]
pub fn context(value: Value) -> PipelineContext {
    PipelineContext::from_value(value).unwrap_or_default()
}
