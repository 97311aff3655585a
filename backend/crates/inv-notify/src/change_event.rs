use crate::{NotifyError, Result};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One decoded change notification.
///
/// The relay enforces no schema beyond "a JSON object"; the record store's
/// trigger decides which keys are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeEvent(Map<String, Value>);

impl ChangeEvent {
    /// Decode a raw payload: UTF-8 text holding a JSON object.
    #[track_caller]
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload)
            .map_err(|e| NotifyError::decode(format!("payload is not UTF-8: {e}")))?;

        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(other) => Err(NotifyError::decode(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(NotifyError::decode(format!("invalid JSON: {e}"))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ChangeEvent {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
