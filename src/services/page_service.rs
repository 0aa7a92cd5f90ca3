// Page service - renders loaded pages against the shared query cache

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    domain::{
        blocks::{BlockCompiler, Page, RenderedBlock},
        template::{Fragment, InterpolationError, LocalScope, TemplateCompiler, VariableContext},
    },
    error::AppError,
    services::query_cache::InMemoryQueryCache,
};

/// A page after its blocks have been rendered
#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    pub id: String,
    pub title: String,
    pub blocks: Vec<RenderedBlock>,
}

pub struct PageService {
    pages: BTreeMap<String, Page>,
    cache: Arc<InMemoryQueryCache>,
}

impl PageService {
    pub fn new(pages: BTreeMap<String, Page>, cache: Arc<InMemoryQueryCache>) -> Self {
        Self { pages, cache }
    }

    /// All loaded pages, ordered by id
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    pub fn page(&self, id: &str) -> Result<&Page, AppError> {
        self.pages
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Unknown page: '{}'", id)))
    }

    pub fn cache(&self) -> &InMemoryQueryCache {
        &self.cache
    }

    /// Render a page, prefilling its forms with `input`
    pub fn render(&self, id: &str, input: &LocalScope) -> Result<RenderedPage, AppError> {
        let page = self.page(id)?;
        let blocks = BlockCompiler::new(self.cache.as_ref())
            .with_input(input)
            .render_page(page)?;

        Ok(RenderedPage {
            id: page.id.clone(),
            title: page.title.clone(),
            blocks,
        })
    }

    /// Turn a form submission into the form's interpolated action
    pub fn submit_form(
        &self,
        page_id: &str,
        form_id: &str,
        values: &LocalScope,
    ) -> Result<String, AppError> {
        let page = self.page(page_id)?;
        BlockCompiler::new(self.cache.as_ref())
            .submit_form(page, form_id, values)
            .map_err(|err| {
                tracing::warn!(page = page_id, form = form_id, "Rejected form submission: {}", err);
                AppError::from(err)
            })
    }

    /// Interpolate a free-standing template, failing on the first unresolved token
    pub fn interpolate(
        &self,
        template: &str,
        local: Option<LocalScope>,
    ) -> Result<String, InterpolationError> {
        let local = local.unwrap_or_default();
        self.compiler().interpolate_to_string(template, Some(&local))
    }

    /// Compile a free-standing template, keeping unresolved tokens as error fragments
    pub fn compile(&self, template: &str, local: Option<LocalScope>) -> Vec<Fragment> {
        let local = local.unwrap_or_default();
        self.compiler().compile_template_to_fragments(template, Some(&local))
    }

    fn compiler(&self) -> TemplateCompiler<'_> {
        TemplateCompiler::new(VariableContext::with_queries(self.cache.as_ref()))
    }
}
