use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

use crate::{
    config::yml_settings::PageSettings,
    domain::blocks::Page,
    services::serializers::{serializer_for, QuerySnapshot},
    validation::validate_page,
};

const DEFAULT_PAGES_FILE: &str = "pages.yml";

/// Pages keyed by id, plus the queries their definitions seed the cache with
#[derive(Debug, Default)]
pub struct PageCatalog {
    pub pages: BTreeMap<String, Page>,
    pub queries: QuerySnapshot,
}

impl PageCatalog {
    /// Parse and validate a pages file
    pub fn parse(yml: &str) -> Result<Self> {
        let settings: Vec<PageSettings> =
            serde_yaml::from_str(yml).context("Invalid yaml page definitions")?;

        let mut catalog = PageCatalog::default();
        for entry in settings {
            let (page, queries) = entry.into_parts();
            validate_page(&page).with_context(|| format!("Invalid page '{}'", page.id))?;
            if catalog.pages.contains_key(&page.id) {
                bail!("Duplicate page id: {}", page.id);
            }
            catalog.queries.extend(queries);
            catalog.pages.insert(page.id.clone(), page);
        }
        Ok(catalog)
    }

    pub fn load(maybe_yml: Option<&str>) -> Result<Self> {
        let path = maybe_yml.unwrap_or(DEFAULT_PAGES_FILE);
        let yml = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read pages file '{}'", path))?;
        let catalog = Self::parse(&yml)?;
        tracing::info!(path, pages = catalog.pages.len(), "Loaded pages");
        Ok(catalog)
    }
}

/// Read query fixtures, YAML or JSON by extension.
///
/// A missing file is an empty cache.
pub fn load_queries(path: &str) -> Result<QuerySnapshot> {
    if !Path::new(path).exists() {
        tracing::info!(path, "No query fixtures found, starting with an empty cache");
        return Ok(QuerySnapshot::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read queries file '{}'", path))?;
    let queries = serializer_for(path)
        .deserialize(&content)
        .with_context(|| format!("Invalid query fixtures in '{}'", path))?;
    tracing::info!(path, queries = queries.len(), "Loaded query fixtures");
    Ok(queries)
}
