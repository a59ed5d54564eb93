//! Check call arguments against a tool's JSON Schema before the tool is built.

use std::fmt;

use serde_json::Value;

/// First schema violation found in a set of arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentViolation {
    NotAnObject { found: &'static str },
    MissingField(String),
    UnknownField(String),
    WrongType {
        field: String,
        expected: String,
        found: &'static str,
    },
}

impl fmt::Display for ArgumentViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject { found } => write!(f, "expected object arguments, got {found}"),
            Self::MissingField(name) => write!(f, "missing required field '{name}'"),
            Self::UnknownField(name) => write!(f, "unexpected field '{name}'"),
            Self::WrongType {
                field,
                expected,
                found,
            } => write!(f, "field '{field}' expected type '{expected}', got {found}"),
        }
    }
}

impl std::error::Error for ArgumentViolation {}

/// Validate top-level arguments: object shape, required fields, declared
/// property types, and `additionalProperties: false`.
pub fn validate_arguments(args: &Value, schema: &Value) -> Result<(), ArgumentViolation> {
    let expects_object = schema.get("type").and_then(Value::as_str) == Some("object");
    let obj = match args.as_object() {
        Some(obj) => obj,
        None if expects_object => {
            return Err(ArgumentViolation::NotAnObject {
                found: json_type_name(args),
            })
        }
        None => return Ok(()),
    };

    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str);
    for name in required {
        if !obj.contains_key(name) {
            return Err(ArgumentViolation::MissingField(name.to_string()));
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    let closed = schema.get("additionalProperties") == Some(&Value::Bool(false));

    for (key, value) in obj {
        let Some(prop_schema) = properties.and_then(|p| p.get(key)) else {
            if closed {
                return Err(ArgumentViolation::UnknownField(key.clone()));
            }
            continue;
        };
        if let Some(expected) = prop_schema.get("type").and_then(Value::as_str) {
            if !value_matches_type(value, expected) {
                return Err(ArgumentViolation::WrongType {
                    field: key.clone(),
                    expected: expected.to_string(),
                    found: json_type_name(value),
                });
            }
        }
    }

    Ok(())
}

fn value_matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
