// Serializers for query cache snapshots

use anyhow::Result;
use serde_json::Value;
use std::collections::BTreeMap;

/// Query cache entries keyed by query id
pub type QuerySnapshot = BTreeMap<String, Value>;

/// Strategy trait for snapshot formats
pub trait QuerySerializer: Send + Sync {
    fn serialize(&self, queries: &QuerySnapshot) -> Result<String>;
    fn deserialize(&self, content: &str) -> Result<QuerySnapshot>;
    fn file_extension(&self) -> &'static str;
    fn content_type(&self) -> &'static str;
}

/// YAML serializer
pub struct YamlSerializer;

impl QuerySerializer for YamlSerializer {
    fn serialize(&self, queries: &QuerySnapshot) -> Result<String> {
        Ok(serde_yaml::to_string(queries)?)
    }

    fn deserialize(&self, content: &str) -> Result<QuerySnapshot> {
        // An empty document is an empty cache, not an error
        if content.trim().is_empty() {
            return Ok(QuerySnapshot::new());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    fn file_extension(&self) -> &'static str {
        "yml"
    }

    fn content_type(&self) -> &'static str {
        "application/x-yaml"
    }
}

/// JSON serializer
pub struct JsonSerializer;

impl QuerySerializer for JsonSerializer {
    fn serialize(&self, queries: &QuerySnapshot) -> Result<String> {
        Ok(serde_json::to_string_pretty(queries)?)
    }

    fn deserialize(&self, content: &str) -> Result<QuerySnapshot> {
        Ok(serde_json::from_str(content)?)
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

/// Pick a serializer from a file path or format name, YAML by default
pub fn serializer_for(path_or_format: &str) -> Box<dyn QuerySerializer> {
    if path_or_format.ends_with("json") {
        Box::new(JsonSerializer)
    } else {
        Box::new(YamlSerializer)
    }
}
