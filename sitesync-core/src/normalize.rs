//! Mapping from raw wire shapes to canonical resources.
//!
//! Backends answer list requests with a bare array, `{"data": [...]}`,
//! paginated `{"results": [...]}`, or nothing at all, and older endpoints use
//! legacy field names. All of that is absorbed here so the rest of the crate
//! sees one shape.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::sync::NetworkError;

/// Envelope keys that may wrap a payload.
const ENVELOPE_KEYS: [&str; 2] = ["data", "results"];

/// Extracts the element list of a list response. `Ok(None)` means no body.
pub fn extract_list(body: Value) -> Result<Option<Vec<Value>>, NetworkError> {
    match body {
        Value::Null => Ok(None),
        Value::Array(items) => Ok(Some(items)),
        Value::Object(mut obj) => {
            for key in ENVELOPE_KEYS {
                if let Some(inner) = obj.remove(key) {
                    return extract_list(inner);
                }
            }
            Err(NetworkError::malformed(
                "Unexpected response from server: expected a list",
            ))
        }
        _ => Err(NetworkError::malformed(
            "Unexpected response from server: expected a list",
        )),
    }
}

/// Unwraps `{"data": {...}}` around a single record.
pub fn extract_record(body: Value) -> Value {
    match body {
        Value::Object(mut obj) if !obj.contains_key("id") => match obj.remove("data") {
            Some(inner @ Value::Object(_)) => inner,
            Some(other) => {
                obj.insert("data".to_string(), other);
                Value::Object(obj)
            }
            None => Value::Object(obj),
        },
        other => other,
    }
}

/// Copies legacy field values into their canonical names when the canonical one is missing or null.
pub fn apply_aliases(value: Value, aliases: &[(&str, &str)]) -> Value {
    let Value::Object(mut obj) = value else {
        return value;
    };
    for (canonical, legacy) in aliases {
        let missing = obj.get(*canonical).map_or(true, Value::is_null);
        if missing {
            if let Some(v) = obj.get(*legacy).cloned() {
                obj.insert(canonical.to_string(), v);
            }
        }
    }
    Value::Object(obj)
}

/// Decodes one record after applying aliases.
pub fn decode_record<T: DeserializeOwned>(
    body: Value,
    aliases: &[(&str, &str)],
) -> Result<T, NetworkError> {
    let value = apply_aliases(extract_record(body), aliases);
    serde_json::from_value(value)
        .map_err(|e| NetworkError::malformed(format!("Unexpected response from server: {}", e)))
}

/// Decodes a list response. A missing body decodes to `None`.
pub fn decode_list<T: DeserializeOwned>(
    body: Value,
    aliases: &[(&str, &str)],
) -> Result<Option<Vec<T>>, NetworkError> {
    let Some(items) = extract_list(body)? else {
        return Ok(None);
    };
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(apply_aliases(item, aliases)).map_err(|e| {
                NetworkError::malformed(format!("Unexpected response from server: {}", e))
            })
        })
        .collect::<Result<Vec<T>, _>>()
        .map(Some)
}
