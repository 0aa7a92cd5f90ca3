// Syntax types for `{{namespace.id.pointer}}` template strings

use serde::Serialize;
use std::fmt;

/// Data source a variable reference reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Entries of the external query cache
    Query,
    /// Arrays registered by mounted loop blocks
    Loop,
    /// Current element of an enclosing loop or table block
    Item,
    /// Caller-supplied local scope
    This,
}

impl Namespace {
    pub fn parse(segment: &str) -> Option<Self> {
        match segment {
            "query" => Some(Namespace::Query),
            "loop" => Some(Namespace::Loop),
            "item" => Some(Namespace::Item),
            "this" => Some(Namespace::This),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Query => "query",
            Namespace::Loop => "loop",
            Namespace::Item => "item",
            Namespace::This => "this",
        }
    }

    /// Whether references into this namespace must carry a pointer.
    ///
    /// `this` and `item` values are handed over directly by the caller or the
    /// enclosing block, so the bare `namespace.id` form is meaningful for them.
    pub fn requires_pointer(&self) -> bool {
        match self {
            Namespace::Query | Namespace::Loop => true,
            Namespace::Item | Namespace::This => false,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parsed interior of one `{{...}}` token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    pub source: String,
    pub namespace: Option<Namespace>,
    pub id: Option<String>,
    pub pointer: Option<String>,
}

impl VariableReference {
    pub fn new(source: String) -> Self {
        Self {
            source,
            namespace: None,
            id: None,
            pointer: None,
        }
    }

    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = Some(namespace);
        self
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_pointer(mut self, pointer: String) -> Self {
        self.pointer = Some(pointer);
        self
    }
}

/// One element of a split template string
#[derive(Debug, Clone, PartialEq)]
pub enum Segment<T> {
    Text(String),
    Match(T),
}
