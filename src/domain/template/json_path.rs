// Dot-separated path lookup into JSON values

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JsonPathError {
    /// The root value is not an object or an array
    #[error("value is not an object or an array")]
    InvalidJson,
    /// A path segment does not exist in its container
    #[error("path does not exist in value")]
    InvalidPath,
}

impl JsonPathError {
    pub fn code(&self) -> &'static str {
        match self {
            JsonPathError::InvalidJson => "invalidJson",
            JsonPathError::InvalidPath => "invalidPath",
        }
    }
}

/// Walk `path` through `json` one `.`-separated segment at a time.
///
/// Array elements are addressed by their decimal index as a plain segment
/// (`items.0.name`). An explicit `null` is a valid leaf; a key that is not
/// present is `InvalidPath`. The empty path returns the root.
pub fn get_value_from_json_path<'a>(json: &'a Value, path: &str) -> Result<&'a Value, JsonPathError> {
    if !is_container(json) {
        return Err(JsonPathError::InvalidJson);
    }

    if path.is_empty() {
        return Ok(json);
    }

    path.split('.')
        .try_fold(json, |current, segment| child(current, segment).ok_or(JsonPathError::InvalidPath))
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn child<'a>(container: &'a Value, segment: &str) -> Option<&'a Value> {
    match container {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => parse_index(segment).and_then(|index| items.get(index)),
        _ => None,
    }
}

// Only canonical decimal indices address array elements: "1" but not "01" or "+1"
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if segment.len() > 1 && segment.starts_with('0') {
        return None;
    }
    segment.parse().ok()
}
