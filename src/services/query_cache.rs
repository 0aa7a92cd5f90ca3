// In-memory query cache shared by all requests

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::serializers::QuerySnapshot;
use crate::domain::template::{QueryCache, QueryState};

/// Query results keyed by query id.
///
/// Writers replace whole entries; readers clone the entry they look up, so a
/// render sees each entry as it was at the moment of the lookup.
#[derive(Debug, Default)]
pub struct InMemoryQueryCache {
    entries: RwLock<HashMap<String, Value>>,
}

impl InMemoryQueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: QuerySnapshot) -> Self {
        Self {
            entries: RwLock::new(snapshot.into_iter().collect()),
        }
    }

    /// Store `data` under `key`, returning the previous entry
    pub fn put(&self, key: &str, data: Value) -> Option<Value> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), data)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    pub fn snapshot(&self) -> QuerySnapshot {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl QueryCache for InMemoryQueryCache {
    fn query_state(&self, key: &str) -> QueryState {
        if self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
        {
            QueryState::Present
        } else {
            QueryState::Absent
        }
    }

    fn query_data(&self, key: &str) -> Option<Value> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}
