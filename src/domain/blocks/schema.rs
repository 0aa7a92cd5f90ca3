// Declarative page and block definitions

use serde::{Deserialize, Serialize};

/// A page is an ordered list of blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    /// Free text with inline variables
    Text { content: String },
    /// Repeats `blocks` once per element of the array `data` refers to
    Loop {
        id: String,
        data: String,
        #[serde(default)]
        blocks: Vec<Block>,
    },
    /// One row per element of the array `data` refers to
    Table {
        id: String,
        data: String,
        columns: Vec<TableColumn>,
    },
    /// Input fields whose submitted values form the `this` scope of `action`
    Form {
        id: String,
        action: String,
        #[serde(default)]
        fields: Vec<FormField>,
    },
}

impl Block {
    /// Id of blocks that own one, used for the `loop` and `item` namespaces
    pub fn id(&self) -> Option<&str> {
        match self {
            Block::Text { .. } => None,
            Block::Loop { id, .. } | Block::Table { id, .. } | Block::Form { id, .. } => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumn {
    pub header: String,
    pub cell: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Initial value, may reference `this` for previously submitted input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub required: bool,
}
