use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw chat-completion payload. Missing usage or content paths read as defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiResponse {
    raw: Value,
}

impl ApiResponse {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }

    pub fn total_tokens(&self) -> u64 {
        self.raw
            .pointer("/usage/total_tokens")
            .and_then(value_to_token_count)
            .unwrap_or(0)
    }

    pub fn message_content(&self) -> &str {
        self.raw
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

impl From<Value> for ApiResponse {
    fn from(raw: Value) -> Self {
        Self::new(raw)
    }
}

fn value_to_token_count(value: &Value) -> Option<u64> {
    if let Some(count) = value.as_u64() {
        return Some(count);
    }
    // Some gateways report usage as floats.
    value
        .as_f64()
        .filter(|count| count.is_finite() && *count >= 0.0)
        .map(|count| count as u64)
}
