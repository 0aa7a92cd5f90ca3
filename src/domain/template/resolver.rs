// Variable resolution against a VariableContext

use serde::{Serialize, Serializer};
use serde_json::{Number, Value};
use std::fmt;
use thiserror::Error;

use super::ast::Namespace;
use super::context::{LocalScope, QueryState, VariableContext};
use super::json_path::{get_value_from_json_path, JsonPathError};
use super::parser::parse_variable;

/// Why a variable reference could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveVariableError {
    #[error("variable does not start with a known namespace")]
    NamespaceUndefined,
    #[error("variable has no id")]
    IdUndefined,
    #[error("variable has no pointer")]
    PointerUndefined,
    #[error("no query is cached under this id")]
    QueryNotFound,
    #[error("no loop is registered under this id")]
    LoopNotFound,
    #[error("nothing is in scope under this id")]
    NoStateForId,
    #[error(transparent)]
    Path(#[from] JsonPathError),
}

impl ResolveVariableError {
    pub fn code(&self) -> &'static str {
        match self {
            ResolveVariableError::NamespaceUndefined => "namespaceUndefined",
            ResolveVariableError::IdUndefined => "idUndefined",
            ResolveVariableError::PointerUndefined => "pointerUndefined",
            ResolveVariableError::QueryNotFound => "queryNotFound",
            ResolveVariableError::LoopNotFound => "loopNotFound",
            ResolveVariableError::NoStateForId => "NoStateForId",
            ResolveVariableError::Path(err) => err.code(),
        }
    }
}

/// Resolution errors plus the checks added by the typed accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RefineError {
    #[error(transparent)]
    Resolve(#[from] ResolveVariableError),
    #[error("value is not an array")]
    NotAnArray,
    #[error("value is not a boolean")]
    NotABoolean,
    #[error("value is not a number")]
    NotANumber,
    #[error("value cannot be converted to a string")]
    CouldNotStringify,
}

impl RefineError {
    pub fn code(&self) -> &'static str {
        match self {
            RefineError::Resolve(err) => err.code(),
            RefineError::NotAnArray => "notAnArray",
            RefineError::NotABoolean => "notABoolean",
            RefineError::NotANumber => "notANumber",
            RefineError::CouldNotStringify => "couldNotStringify",
        }
    }
}

// Serialized as its code so rendered output can carry it
impl Serialize for RefineError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// A resolved value that can be placed into rendered output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Renderable {
    /// Scalars, shown as plain text
    Text(String),
    /// Objects and arrays, shown as pretty-printed JSON
    Json(String),
}

impl Renderable {
    pub fn as_str(&self) -> &str {
        match self {
            Renderable::Text(text) | Renderable::Json(text) => text,
        }
    }
}

impl fmt::Display for Renderable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves `namespace.id.pointer` references within one context
#[derive(Clone)]
pub struct VariableResolver<'a> {
    context: VariableContext<'a>,
}

impl<'a> VariableResolver<'a> {
    pub fn new(context: VariableContext<'a>) -> Self {
        Self { context }
    }

    /// Resolve one token interior to its untyped JSON value.
    ///
    /// # Panics
    ///
    /// Panics when the reference uses the `this` namespace and no local scope
    /// was supplied. That is a misuse of the API by the caller, not missing data.
    pub fn resolve_variable(
        &self,
        value: &str,
        local: Option<&LocalScope>,
    ) -> Result<Value, ResolveVariableError> {
        let result = self.resolve_reference(value, local);
        if let Err(err) = &result {
            tracing::debug!(variable = value, code = err.code(), "variable resolution failed");
        }
        result
    }

    fn resolve_reference(
        &self,
        value: &str,
        local: Option<&LocalScope>,
    ) -> Result<Value, ResolveVariableError> {
        let reference = parse_variable(value);

        let namespace = reference
            .namespace
            .ok_or(ResolveVariableError::NamespaceUndefined)?;
        let id = reference.id.as_deref().ok_or(ResolveVariableError::IdUndefined)?;
        if namespace.requires_pointer() && reference.pointer.is_none() {
            return Err(ResolveVariableError::PointerUndefined);
        }
        let pointer = reference.pointer.as_deref().unwrap_or("");

        match namespace {
            Namespace::This => {
                let Some(local) = local else {
                    panic!(
                        "variable '{}' uses the `this` namespace but no local variables were supplied",
                        reference.source
                    );
                };
                let entry = local.get(id).ok_or(ResolveVariableError::NoStateForId)?;
                select(entry, pointer)
            }
            Namespace::Item => {
                let entry = self
                    .context
                    .item(id)
                    .ok_or(ResolveVariableError::NoStateForId)?;
                select(entry, pointer)
            }
            Namespace::Query => {
                let queries = self.context.queries();
                if queries.query_state(id) == QueryState::Absent {
                    return Err(ResolveVariableError::QueryNotFound);
                }
                let data = queries
                    .query_data(id)
                    .ok_or(ResolveVariableError::QueryNotFound)?;
                select(&data, pointer)
            }
            Namespace::Loop => {
                let content = self
                    .context
                    .loop_content(id)
                    .ok_or(ResolveVariableError::LoopNotFound)?;
                select(&content, pointer)
            }
        }
    }

    pub fn as_string_compatible(
        &self,
        value: &str,
        local: Option<&LocalScope>,
    ) -> Result<String, RefineError> {
        let resolved = self.resolve_variable(value, local)?;
        stringify_value(&resolved).ok_or(RefineError::CouldNotStringify)
    }

    pub fn as_array(&self, value: &str, local: Option<&LocalScope>) -> Result<Vec<Value>, RefineError> {
        match self.resolve_variable(value, local)? {
            Value::Array(items) => Ok(items),
            _ => Err(RefineError::NotAnArray),
        }
    }

    pub fn as_boolean(&self, value: &str, local: Option<&LocalScope>) -> Result<bool, RefineError> {
        self.resolve_variable(value, local)?
            .as_bool()
            .ok_or(RefineError::NotABoolean)
    }

    pub fn as_number(&self, value: &str, local: Option<&LocalScope>) -> Result<f64, RefineError> {
        self.resolve_variable(value, local)?
            .as_f64()
            .ok_or(RefineError::NotANumber)
    }

    /// Resolve to something that can always be placed into rendered markup
    pub fn as_renderable(
        &self,
        value: &str,
        local: Option<&LocalScope>,
    ) -> Result<Renderable, RefineError> {
        let resolved = self.resolve_variable(value, local)?;
        match stringify_value(&resolved) {
            Some(text) => Ok(Renderable::Text(text)),
            None => Ok(Renderable::Json(
                serde_json::to_string_pretty(&resolved).unwrap_or_default(),
            )),
        }
    }
}

impl Default for VariableResolver<'_> {
    fn default() -> Self {
        Self::new(VariableContext::empty())
    }
}

fn select(value: &Value, pointer: &str) -> Result<Value, ResolveVariableError> {
    if pointer.is_empty() {
        return Ok(value.clone());
    }
    Ok(get_value_from_json_path(value, pointer)?.clone())
}

/// Text form of a scalar; `None` for objects and arrays
pub fn stringify_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_to_string(n)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

// Integral floats print without a fractional part, `2.0` as `2`
fn number_to_string(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{:.0}", f)
            }
        }
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template::context::LoopStore;
    use serde_json::json;
    use std::collections::HashMap;

    fn cache() -> HashMap<String, Value> {
        let mut cache = HashMap::new();
        cache.insert("user".to_string(), json!({"name": "John", "age": 42, "admin": true}));
        cache.insert(
            "company-list".to_string(),
            json!({"data": [{"name": "Acme"}, {"name": "Globex"}], "total": null}),
        );
        cache.insert("scalar".to_string(), json!("just text"));
        cache
    }

    fn local(value: Value) -> LocalScope {
        match value {
            Value::Object(map) => map,
            _ => panic!("local scope must be an object"),
        }
    }

    #[test]
    fn test_resolve_query_value() {
        let cache = cache();
        let resolver = VariableResolver::new(VariableContext::with_queries(&cache));
        assert_eq!(
            resolver.resolve_variable("query.company-list.data.0.name", None),
            Ok(json!("Acme"))
        );
        assert_eq!(
            resolver.resolve_variable("query.company-list.total", None),
            Ok(Value::Null)
        );
    }

    #[test]
    fn test_validation_errors() {
        let resolver = VariableResolver::default();
        assert_eq!(
            resolver.resolve_variable("", None),
            Err(ResolveVariableError::NamespaceUndefined)
        );
        assert_eq!(
            resolver.resolve_variable("state.user.name", None),
            Err(ResolveVariableError::NamespaceUndefined)
        );
        assert_eq!(
            resolver.resolve_variable("query", None),
            Err(ResolveVariableError::IdUndefined)
        );
        assert_eq!(
            resolver.resolve_variable("query.user", None),
            Err(ResolveVariableError::PointerUndefined)
        );
        assert_eq!(
            resolver.resolve_variable("loop.items", None),
            Err(ResolveVariableError::PointerUndefined)
        );
    }

    #[test]
    fn test_lookup_errors() {
        let cache = cache();
        let store = LoopStore::new();
        let resolver = VariableResolver::new(VariableContext::new(&cache, &store));
        assert_eq!(
            resolver.resolve_variable("query.missing.a", None),
            Err(ResolveVariableError::QueryNotFound)
        );
        assert_eq!(
            resolver.resolve_variable("loop.missing.0", None),
            Err(ResolveVariableError::LoopNotFound)
        );
        assert_eq!(
            resolver.resolve_variable("item.missing", None),
            Err(ResolveVariableError::NoStateForId)
        );
    }

    #[test]
    fn test_path_errors_pass_through() {
        let cache = cache();
        let resolver = VariableResolver::new(VariableContext::with_queries(&cache));
        assert_eq!(
            resolver.resolve_variable("query.user.email", None),
            Err(ResolveVariableError::Path(JsonPathError::InvalidPath))
        );
        assert_eq!(
            resolver.resolve_variable("query.scalar.length", None),
            Err(ResolveVariableError::Path(JsonPathError::InvalidJson))
        );
        assert_eq!(
            resolver
                .resolve_variable("query.scalar.length", None)
                .unwrap_err()
                .code(),
            "invalidJson"
        );
    }

    #[test]
    fn test_loop_and_item_namespaces() {
        let store = LoopStore::new();
        store.set_variable("items", vec![json!("a"), json!("b")]);
        let context = VariableContext::new(&crate::domain::template::NoQueries, &store)
            .with_item("items", json!("a"));
        let resolver = VariableResolver::new(context);

        assert_eq!(resolver.resolve_variable("loop.items.0", None), Ok(json!("a")));
        assert_eq!(resolver.resolve_variable("loop.items.1", None), Ok(json!("b")));
        assert_eq!(resolver.resolve_variable("item.items", None), Ok(json!("a")));
    }

    #[test]
    fn test_local_scope() {
        let resolver = VariableResolver::default();
        let scope = local(json!({"input": "typed", "address": {"city": "Oslo"}}));

        assert_eq!(
            resolver.resolve_variable("this.input", Some(&scope)),
            Ok(json!("typed"))
        );
        assert_eq!(
            resolver.resolve_variable("this.address.city", Some(&scope)),
            Ok(json!("Oslo"))
        );
        assert_eq!(
            resolver.resolve_variable("this.other", Some(&scope)),
            Err(ResolveVariableError::NoStateForId)
        );
    }

    #[test]
    #[should_panic(expected = "no local variables were supplied")]
    fn test_local_scope_required() {
        let resolver = VariableResolver::default();
        let _ = resolver.resolve_variable("this.input", None);
    }

    #[test]
    fn test_typed_accessors() {
        let cache = cache();
        let resolver = VariableResolver::new(VariableContext::with_queries(&cache));

        assert_eq!(resolver.as_string_compatible("query.user.name", None), Ok("John".to_string()));
        assert_eq!(resolver.as_string_compatible("query.user.age", None), Ok("42".to_string()));
        assert_eq!(resolver.as_string_compatible("query.user.admin", None), Ok("true".to_string()));
        assert_eq!(resolver.as_string_compatible("query.company-list.total", None), Ok(String::new()));
        assert_eq!(
            resolver.as_string_compatible("query.company-list.data", None),
            Err(RefineError::CouldNotStringify)
        );

        assert_eq!(resolver.as_array("query.company-list.data", None).map(|v| v.len()), Ok(2));
        assert_eq!(resolver.as_array("query.user.name", None), Err(RefineError::NotAnArray));

        assert_eq!(resolver.as_boolean("query.user.admin", None), Ok(true));
        assert_eq!(resolver.as_boolean("query.user.age", None), Err(RefineError::NotABoolean));

        assert_eq!(resolver.as_number("query.user.age", None), Ok(42.0));
        assert_eq!(resolver.as_number("query.user.name", None), Err(RefineError::NotANumber));
    }

    #[test]
    fn test_typed_accessors_pass_resolution_errors_through() {
        let resolver = VariableResolver::default();
        let err = resolver.as_array("query.missing.data", None).unwrap_err();
        assert_eq!(err, RefineError::Resolve(ResolveVariableError::QueryNotFound));
        assert_eq!(err.code(), "queryNotFound");
    }

    #[test]
    fn test_integral_floats_stringify_without_fraction() {
        let mut cache = HashMap::new();
        cache.insert("n".to_string(), json!({"whole": 2.0, "half": 2.5, "int": 7, "neg": -3.0, "zero": -0.0}));
        let resolver = VariableResolver::new(VariableContext::with_queries(&cache));

        assert_eq!(resolver.as_string_compatible("query.n.whole", None), Ok("2".to_string()));
        assert_eq!(resolver.as_string_compatible("query.n.half", None), Ok("2.5".to_string()));
        assert_eq!(resolver.as_string_compatible("query.n.int", None), Ok("7".to_string()));
        assert_eq!(resolver.as_string_compatible("query.n.neg", None), Ok("-3".to_string()));
        assert_eq!(resolver.as_string_compatible("query.n.zero", None), Ok("0".to_string()));
        assert_eq!(stringify_value(&json!(1e20)), Some("100000000000000000000".to_string()));
    }

    #[test]
    fn test_renderable() {
        let cache = cache();
        let resolver = VariableResolver::new(VariableContext::with_queries(&cache));
        assert_eq!(
            resolver.as_renderable("query.user.name", None),
            Ok(Renderable::Text("John".to_string()))
        );
        match resolver.as_renderable("query.company-list.data.1", None) {
            Ok(Renderable::Json(json)) => assert!(json.contains("\"Globex\"")),
            other => panic!("Expected JSON renderable, got {:?}", other),
        }
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let cache = cache();
        let resolver = VariableResolver::new(VariableContext::with_queries(&cache));
        let first = resolver.resolve_variable("query.company-list.data", None);
        let second = resolver.resolve_variable("query.company-list.data", None);
        assert_eq!(first, second);
    }
}
