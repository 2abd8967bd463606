use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Word limit sent by the legacy contract when the caller gives none.
pub const DEFAULT_MAX_WORDS: u32 = 10;

/// Body of a `POST /extract` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_words: Option<u32>,
}

impl ExtractionRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_words: None,
        }
    }

    /// Legacy body; a missing or zero limit becomes [`DEFAULT_MAX_WORDS`].
    pub fn legacy(text: impl Into<String>, max_words: Option<u32>) -> Self {
        Self {
            text: text.into(),
            max_words: Some(max_words.filter(|n| *n > 0).unwrap_or(DEFAULT_MAX_WORDS)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("extraction response must be a JSON object, got {kind}")]
pub struct NotAnObject {
    pub kind: &'static str,
}

/// Whatever JSON object the extraction endpoint returned, kept as-is.
///
/// The backend has produced more than one response shape over time, so no key
/// set is assumed. Use [`ExtractionResult::decode`] with [`ExtractedSummary`],
/// [`BrokerDetails`] or any other type to get a typed view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult(Map<String, Value>);

impl ExtractionResult {
    pub fn from_value(value: Value) -> Result<Self, NotAnObject> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(NotAnObject {
                kind: json_kind(&other),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }
}

impl From<Map<String, Value>> for ExtractionResult {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl fmt::Display for ExtractionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pretty = serde_json::to_string_pretty(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&pretty)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Word-truncation response produced by the first backend revision.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractedSummary {
    pub extracted_text: String,
    #[serde(default)]
    pub word_count: Option<u32>,
    #[serde(default)]
    pub max_words: Option<u32>,
}

/// Broker contact response produced by the agent-backed backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BrokerDetails {
    pub broker_name: String,
    pub broker_email: String,
    pub brokerage: String,
    pub complete_address: String,
    #[serde(default)]
    pub broker_name_confidence: Option<f64>,
    #[serde(default)]
    pub broker_email_confidence: Option<f64>,
    #[serde(default)]
    pub brokerage_confidence: Option<f64>,
    #[serde(default)]
    pub complete_address_confidence: Option<f64>,
}
