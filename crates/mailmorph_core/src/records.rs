use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::timestamp::{normalize_timestamp, NormalizedTimestamp};

/// Store document id, either already stringified or in `{"$oid": ...}` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Plain(String),
    ObjectId {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

impl DocumentId {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentId::Plain(id) => id,
            DocumentId::ObjectId { oid } => oid,
        }
    }
}

/// A telemetry table row. Fields are decoded one by one; a missing field or one
/// of the wrong type is left empty instead of failing the row.
pub trait TelemetryRow: DeserializeOwned + Default {
    /// Rows that are not objects come back with every field empty.
    fn from_row(row: Value) -> Self {
        serde_json::from_value(row).unwrap_or_default()
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// One row of the metrics table; one per completed extraction on the server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<DocumentId>,
    #[serde(default, deserialize_with = "lenient")]
    pub tokens_used: Option<i64>,
    /// Milliseconds.
    #[serde(default, deserialize_with = "lenient")]
    pub latency: Option<f64>,
    #[serde(default)]
    pub timestamp: Value,
}

impl TelemetryRow for MetricRecord {}

impl MetricRecord {
    pub fn normalized_timestamp(&self) -> NormalizedTimestamp {
        normalize_timestamp(&self.timestamp)
    }
}

/// One row of the request log table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub request_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub source_hash: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub cache_hit: Option<bool>,
    /// Milliseconds.
    #[serde(default, deserialize_with = "lenient")]
    pub latency: Option<f64>,
    #[serde(default)]
    pub timestamp: Value,
}

impl TelemetryRow for LogRecord {}

impl LogRecord {
    pub fn normalized_timestamp(&self) -> NormalizedTimestamp {
        normalize_timestamp(&self.timestamp)
    }
}
