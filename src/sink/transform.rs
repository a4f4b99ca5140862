// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire transform for the Elasticsearch sink.
//!
//! ```text
//! {timestamp, message, level, meta}
//!   -> {"@timestamp", "message", "severity", "fields",
//!       "transaction"?, "trace"?, "span"?}
//! ```

use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};

use crate::record::{FormattedRecord, LogLevel, iso_timestamp};

/// Key of the debug tag inside `fields`.
pub const DEBUG_FIELD: &str = "metadata.context.debug";

/// Metadata keys promoted to top-level `{"id": ..}` objects.
pub const CORRELATION_IDS: [(&str, &str); 3] = [
    ("transaction.id", "transaction"),
    ("trace.id", "trace"),
    ("span.id", "span"),
];

/// Input of [`transform`].
#[derive(Debug, Clone, PartialEq)]
pub struct LogData {
    pub timestamp: Option<DateTime<Utc>>,
    pub message: String,
    pub level: LogLevel,
    pub meta: Map<String, Value>,
}

impl TryFrom<&FormattedRecord> for LogData {
    type Error = serde_json::Error;

    fn try_from(record: &FormattedRecord) -> Result<Self, Self::Error> {
        let mut meta = Map::new();
        if let Some(entry) = &record.metadata {
            meta.insert("metadata".to_string(), serde_json::to_value(entry)?);
        }

        Ok(Self {
            timestamp: Some(record.timestamp),
            message: record.message.clone(),
            level: record.level,
            meta,
        })
    }
}

// null, false, 0 and "" count as absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reshape a record into the document shipped to the index.
pub fn transform(data: &LogData, debug_tag: Option<&str>) -> Value {
    let timestamp = data.timestamp.unwrap_or_else(Utc::now);

    let mut fields = data.meta.clone();
    if let Some(tag) = debug_tag {
        fields.insert(DEBUG_FIELD.to_string(), Value::String(tag.to_string()));
    }

    let mut document = Map::new();
    document.insert("@timestamp".to_string(), json!(iso_timestamp(&timestamp)));
    document.insert("message".to_string(), json!(data.message));
    document.insert("severity".to_string(), json!(data.level.as_str()));
    document.insert("fields".to_string(), Value::Object(fields));

    for (meta_key, field) in CORRELATION_IDS {
        if let Some(id) = data.meta.get(meta_key).filter(|id| is_truthy(id)) {
            document.insert(field.to_string(), json!({ "id": id }));
        }
    }

    Value::Object(document)
}
