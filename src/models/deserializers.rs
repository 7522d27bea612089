use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

/// Fallback identifier for documents the backend returned without one
pub fn generate_document_id() -> String {
    format!("doc-{}", Uuid::new_v4())
}

/// Custom deserializer for document ids that accepts strings and integers.
///
/// Empty strings and `null` are replaced by a generated id so every loaded
/// document can still be addressed in the list.
pub fn deserialize_document_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(generate_document_id()),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(generate_document_id()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(Error::custom("document id must be a string or a number")),
    }
}

/// Custom deserializer for ingestion timestamps.
///
/// The backend records `time.time()`, i.e. Unix seconds with a fractional part,
/// but some stores hand back ISO strings instead. Accepts:
/// - numbers as Unix seconds (integer or float)
/// - RFC3339 strings
/// - naive ISO strings (`2024-05-01T10:00:00[.fff]`), read as UTC
pub fn deserialize_added_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            let seconds = n.as_f64().ok_or_else(|| Error::custom("invalid timestamp"))?;
            let millis = (seconds * 1000.0).round() as i64;
            DateTime::from_timestamp_millis(millis)
                .map(Some)
                .ok_or_else(|| Error::custom("timestamp out of range"))
        }
        Some(Value::String(s)) => {
            if let Ok(ts) = s.parse::<DateTime<Utc>>() {
                return Ok(Some(ts));
            }
            NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| Some(naive.and_utc()))
                .map_err(|e| Error::custom(format!("invalid timestamp '{}': {}", s, e)))
        }
        Some(_) => Err(Error::custom("timestamp must be a number or string")),
    }
}

/// Treats `null` like a missing field and falls back to the type's default
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
