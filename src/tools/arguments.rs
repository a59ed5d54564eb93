//! Parsed tool call arguments.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ParleyError;

/// Named arguments for one tool call, parsed from the JSON text the remote
/// run delivers.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolArguments {
    value: Value,
}

impl ToolArguments {
    /// Wrap an already-parsed arguments object.
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Parse the raw arguments payload. Blank payloads mean "no arguments";
    /// anything else must be a JSON object.
    pub fn parse(raw: &str) -> Result<Self, ParleyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::new(Value::Object(Map::new())));
        }
        let value: Value = serde_json::from_str(trimmed).map_err(|e| {
            ParleyError::InvalidArgument(format!("arguments are not valid JSON: {e}"))
        })?;
        if !value.is_object() {
            return Err(ParleyError::InvalidArgument(format!(
                "arguments must be a JSON object, got {value}"
            )));
        }
        Ok(Self::new(value))
    }

    /// Get the raw JSON value.
    pub fn raw(&self) -> &Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, ParleyError> {
        self.value
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| ParleyError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(Value::as_str)
    }

    /// Get an integer argument.
    pub fn get_i64(&self, key: &str) -> Result<i64, ParleyError> {
        self.value
            .get(key)
            .and_then(Value::as_i64)
            .ok_or_else(|| ParleyError::InvalidArgument(format!("Missing integer argument: {key}")))
    }

    /// Get a float argument.
    pub fn get_f64(&self, key: &str) -> Result<f64, ParleyError> {
        self.value
            .get(key)
            .and_then(Value::as_f64)
            .ok_or_else(|| ParleyError::InvalidArgument(format!("Missing float argument: {key}")))
    }

    /// Get a boolean argument.
    pub fn get_bool(&self, key: &str) -> Result<bool, ParleyError> {
        self.value
            .get(key)
            .and_then(Value::as_bool)
            .ok_or_else(|| ParleyError::InvalidArgument(format!("Missing boolean argument: {key}")))
    }

    /// Deserialize the whole payload into a typed struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ParleyError> {
        serde_json::from_value(self.value.clone())
            .map_err(|e| ParleyError::InvalidArgument(format!("invalid arguments: {e}")))
    }
}
