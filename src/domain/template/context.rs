// Layered data sources variables are resolved against

use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

/// Caller-supplied values for the `this` namespace
pub type LocalScope = Map<String, Value>;

/// Whether the query cache holds an entry for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Present,
    Absent,
}

/// Read-only view of the external query cache.
///
/// Implementations return whatever they hold at the moment of the call;
/// the resolver never writes through this trait.
pub trait QueryCache: Send + Sync {
    fn query_state(&self, key: &str) -> QueryState;
    fn query_data(&self, key: &str) -> Option<Value>;
}

/// A cache with nothing in it, used when no cache is in scope
pub struct NoQueries;

impl QueryCache for NoQueries {
    fn query_state(&self, _key: &str) -> QueryState {
        QueryState::Absent
    }

    fn query_data(&self, _key: &str) -> Option<Value> {
        None
    }
}

impl QueryCache for HashMap<String, Value> {
    fn query_state(&self, key: &str) -> QueryState {
        if self.contains_key(key) {
            QueryState::Present
        } else {
            QueryState::Absent
        }
    }

    fn query_data(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

/// Outcome of registering a loop's content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Written,
    AlreadyInitialized,
}

/// Arrays registered by mounted loop blocks, keyed by loop id.
///
/// One store lives for one root render. Each id is written once per mount:
/// repeated registrations while the id is mounted leave the first content in
/// place, and `release` clears it when the loop unmounts.
#[derive(Debug, Default)]
pub struct LoopStore {
    entries: RefCell<HashMap<String, Arc<Value>>>,
}

impl LoopStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_variable(&self, id: &str, content: Vec<Value>) -> Registration {
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(id) {
            tracing::debug!(loop_id = id, "loop already initialized, keeping first content");
            return Registration::AlreadyInitialized;
        }

        tracing::debug!(loop_id = id, len = content.len(), "registering loop content");
        entries.insert(id.to_string(), Arc::new(Value::Array(content)));
        Registration::Written
    }

    pub fn is_initialized(&self, id: &str) -> bool {
        self.entries.borrow().contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Value>> {
        self.entries.borrow().get(id).cloned()
    }

    /// Snapshot of every registered loop
    pub fn variables(&self) -> HashMap<String, Arc<Value>> {
        self.entries.borrow().clone()
    }

    pub fn release(&self, id: &str) {
        self.entries.borrow_mut().remove(id);
    }
}

/// The composed mapping a subtree resolves variables against.
///
/// Contexts are immutable. `with_item` derives a child context that keeps
/// every inherited entry and overrides only the given id.
#[derive(Clone)]
pub struct VariableContext<'a> {
    queries: &'a dyn QueryCache,
    loops: Option<&'a LoopStore>,
    items: Arc<HashMap<String, Value>>,
}

impl<'a> VariableContext<'a> {
    pub fn new(queries: &'a dyn QueryCache, loops: &'a LoopStore) -> Self {
        Self {
            queries,
            loops: Some(loops),
            items: Arc::new(HashMap::new()),
        }
    }

    /// Context with only a query cache in scope
    pub fn with_queries(queries: &'a dyn QueryCache) -> Self {
        Self {
            queries,
            loops: None,
            items: Arc::new(HashMap::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with_queries(&NoQueries)
    }

    pub fn with_item(&self, id: &str, element: Value) -> Self {
        let mut items = (*self.items).clone();
        items.insert(id.to_string(), element);
        Self {
            queries: self.queries,
            loops: self.loops,
            items: Arc::new(items),
        }
    }

    pub fn queries(&self) -> &'a dyn QueryCache {
        self.queries
    }

    pub fn item(&self, id: &str) -> Option<&Value> {
        self.items.get(id)
    }

    pub fn loop_content(&self, id: &str) -> Option<Arc<Value>> {
        self.loops.and_then(|store| store.get(id))
    }
}

impl Default for VariableContext<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_context_finds_nothing() {
        let context = VariableContext::empty();
        assert_eq!(context.queries().query_state("anything"), QueryState::Absent);
        assert!(context.loop_content("items").is_none());
        assert!(context.item("items").is_none());
    }

    #[test]
    fn test_loop_store_writes_once_per_mount() {
        let store = LoopStore::new();
        assert_eq!(store.set_variable("items", vec![json!("a")]), Registration::Written);
        assert_eq!(
            store.set_variable("items", vec![json!("b")]),
            Registration::AlreadyInitialized
        );
        assert_eq!(store.get("items").as_deref(), Some(&json!(["a"])));

        store.release("items");
        assert!(!store.is_initialized("items"));
        assert_eq!(store.set_variable("items", vec![json!("b")]), Registration::Written);
        assert_eq!(store.get("items").as_deref(), Some(&json!(["b"])));
    }

    #[test]
    fn test_loop_store_snapshot() {
        let store = LoopStore::new();
        store.set_variable("a", vec![json!(1)]);
        store.set_variable("b", vec![]);
        let variables = store.variables();
        assert_eq!(variables.len(), 2);
        assert_eq!(variables["b"].as_ref(), &json!([]));
    }

    #[test]
    fn test_with_item_merges_into_parent() {
        let store = LoopStore::new();
        let root = VariableContext::new(&NoQueries, &store);
        let outer = root.with_item("outer", json!({"n": 1}));
        let inner = outer.with_item("inner", json!("x"));

        assert_eq!(inner.item("outer"), Some(&json!({"n": 1})));
        assert_eq!(inner.item("inner"), Some(&json!("x")));
        // parents are untouched
        assert!(outer.item("inner").is_none());
        assert!(root.item("outer").is_none());
    }

    #[test]
    fn test_hash_map_query_cache() {
        let mut cache = HashMap::new();
        cache.insert("user".to_string(), json!({"name": "John"}));
        assert_eq!(cache.query_state("user"), QueryState::Present);
        assert_eq!(cache.query_state("other"), QueryState::Absent);
        assert_eq!(cache.query_data("user"), Some(json!({"name": "John"})));
    }
}
