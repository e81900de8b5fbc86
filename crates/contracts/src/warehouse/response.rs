use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Generic response envelope of the gateway:
/// `{ "success": bool, "message"?: string, "<field>": [...] }`
///
/// `success` and `message` are kept as raw values: older routes answer with
/// `1`/`0`, omit the flag, or put codes in `message`. Use
/// [`ApiEnvelope::is_success`] and [`ApiEnvelope::message_text`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub message: Value,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ApiEnvelope {
    /// Truthiness of the `success` flag (missing, `null`, `false`, `0` and `""` are falsy)
    pub fn is_success(&self) -> bool {
        is_truthy(&self.success)
    }

    /// Non-empty textual `message`, if any
    pub fn message_text(&self) -> Option<&str> {
        self.message.as_str().filter(|m| !m.is_empty())
    }

    /// Take the array stored under `field`; missing or non-array is empty
    pub fn take_array(&mut self, field: &str) -> Vec<Value> {
        match self.payload.remove(field) {
            Some(Value::Array(values)) => values,
            _ => Vec::new(),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
