//! The JSON payload every tool returns.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a tool call, serialized as the tool's text content.
///
/// Successful calls carry `data` and a human-readable `message`; list calls
/// also carry `count`. Failed calls carry `error` and a generic `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl ToolResponse {
    /// Successful list result; `count` is the number of items.
    pub fn list(items: Vec<Value>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            count: Some(items.len()),
            data: Some(Value::Array(items)),
            message: Some(message.into()),
            error: None,
        }
    }

    /// Successful single-item result.
    pub fn item(data: Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
            count: None,
        }
    }

    /// Failed result.
    pub fn failure(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error: Some(error.into()),
            count: None,
        }
    }

    /// Attaches a data payload, typically an empty list on failed list calls.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Serializes the response as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
