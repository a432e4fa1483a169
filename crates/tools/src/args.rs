//! Argument extraction and payload helpers shared by the built-in tools.

use policybot_core::error::ToolError;
use policybot_core::observation::{Args, Payload};
use serde::Serialize;
use serde_json::Value;

/// A required, non-null string argument.
pub(crate) fn required_str<'a>(args: &'a Args, key: &str) -> Result<&'a str, ToolError> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(Value::Null) | None => Err(ToolError::InvalidArguments(format!(
            "Missing '{key}' argument"
        ))),
        Some(_) => Err(ToolError::InvalidArguments(format!(
            "'{key}' must be a string"
        ))),
    }
}

/// An optional string argument. `null` counts as absent.
pub(crate) fn optional_str<'a>(args: &'a Args, key: &str) -> Result<Option<&'a str>, ToolError> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(ToolError::InvalidArguments(format!(
            "'{key}' must be a string"
        ))),
    }
}

/// An optional integer argument; numeric strings are accepted.
pub(crate) fn optional_i64(args: &Args, key: &str) -> Result<Option<i64>, ToolError> {
    match args.get(key) {
        Some(Value::Null) | None => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| ToolError::InvalidArguments(format!("'{key}' must be an integer"))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ToolError::InvalidArguments(format!("'{key}' must be an integer"))),
        Some(_) => Err(ToolError::InvalidArguments(format!(
            "'{key}' must be an integer"
        ))),
    }
}

/// An optional object argument. `null` counts as absent.
pub(crate) fn optional_object<'a>(
    args: &'a Args,
    key: &str,
) -> Result<Option<&'a serde_json::Map<String, Value>>, ToolError> {
    match args.get(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(ToolError::InvalidArguments(format!(
            "'{key}' must be an object"
        ))),
    }
}

/// Serialize a tool result into a payload object.
pub(crate) fn into_payload<T: Serialize>(tool_name: &str, value: &T) -> Result<Payload, ToolError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ToolError::ExecutionFailed {
            tool_name: tool_name.to_string(),
            reason: format!("result is not an object: {other}"),
        }),
        Err(e) => Err(ToolError::ExecutionFailed {
            tool_name: tool_name.to_string(),
            reason: e.to_string(),
        }),
    }
}
