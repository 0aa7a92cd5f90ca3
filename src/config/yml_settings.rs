use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::blocks::{Block, Page};

/// One entry of the pages file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct PageSettings {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
    /// Query results to seed the cache with, keyed by query id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queries: Option<BTreeMap<String, Value>>,
}

impl PageSettings {
    /// Split into the page and its seed queries
    pub fn into_parts(self) -> (Page, BTreeMap<String, Value>) {
        let page = Page {
            id: self.id,
            title: self.title,
            blocks: self.blocks,
        };
        (page, self.queries.unwrap_or_default())
    }
}
