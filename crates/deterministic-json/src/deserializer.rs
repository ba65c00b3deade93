//! Parsing JSON text into canonical values.

use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::canonicalizer::canonicalize;
use crate::error::{Error, Result};
use crate::value::{Map, Value};

/// Parses `text` and returns it with every object's keys sorted.
///
/// Malformed input fails with [`Error::Syntax`]. Input nested deeper than
/// serde_json's recursion limit is rejected the same way.
pub fn deserialize(text: &str) -> Result<Value> {
    trace!(len = text.len(), "parsing JSON text");
    let parsed: Value = serde_json::from_str(text).map_err(|err| {
        debug!(line = err.line(), column = err.column(), "rejected JSON text");
        Error::syntax(&err)
    })?;
    canonicalize(&parsed)
}

/// Like [`deserialize`], then applies `reviver` bottom-up.
///
/// `reviver(key, value)` sees children before their parent, object entries in
/// sorted key order, array elements keyed by index and the root keyed by `""`.
/// Returning [`Value::Omitted`] deletes an object entry; in an array it leaves
/// an omitted slot. The reviver's output is returned as is.
pub fn deserialize_with<F>(text: &str, mut reviver: F) -> Result<Value>
where
    F: FnMut(&str, Value) -> Value,
{
    let canonical = deserialize(text)?;
    Ok(revive("", canonical, &mut reviver))
}

/// Parses `text`, sorts it, and converts the result into `T`.
pub fn deserialize_as<T: DeserializeOwned>(text: &str) -> Result<T> {
    let canonical = deserialize(text)?;
    serde_json::from_value(serde_json::Value::from(canonical))
        .map_err(|err| Error::UnsupportedValue(err.to_string()))
}

fn revive<F>(key: &str, value: Value, reviver: &mut F) -> Value
where
    F: FnMut(&str, Value) -> Value,
{
    let value = match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| revive(&index.to_string(), item, reviver))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, child) in map {
                let revived = revive(&key, child, reviver);
                if !revived.is_omitted() {
                    out.insert(key, revived);
                }
            }
            Value::Object(out)
        }
        scalar => scalar,
    };
    reviver(key, value)
}
