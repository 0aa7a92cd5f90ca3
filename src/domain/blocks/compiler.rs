// Renders page blocks against the query cache and loop state

use serde::Serialize;
use serde_json::Value;

use super::error::{FormError, PageError};
use super::form_builder::{build_form_data, FormVariable};
use super::schema::{Block, FormField, Page, TableColumn};
use crate::domain::template::{
    stringify_value, variable_tokens, Fragment, LocalScope, LoopStore, QueryCache, RefineError,
    Registration, TemplateCompiler, VariableContext,
};

/// Output of one block, ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RenderedBlock {
    Text {
        fragments: Vec<Fragment>,
    },
    Loop {
        id: String,
        iterations: Vec<Vec<RenderedBlock>>,
    },
    Table {
        id: String,
        headers: Vec<Vec<Fragment>>,
        rows: Vec<Vec<Vec<Fragment>>>,
    },
    Form {
        id: String,
        fields: Vec<FormVariable>,
    },
    /// The block's data could not be resolved; nothing of it was rendered
    Error {
        block_id: String,
        token: String,
        error: RefineError,
    },
}

/// The variable reference a loop or table iterates over.
///
/// `data` may be written as a bare reference (`query.list.items`) or as a
/// single token (`{{ query.list.items }}`).
pub(crate) fn data_reference(data: &str) -> &str {
    let trimmed = data.trim();
    let tokens = variable_tokens(trimmed);
    match tokens.as_slice() {
        [token] if trimmed.starts_with("{{") && trimmed.ends_with("}}") => *token,
        _ => trimmed,
    }
}

/// Renders blocks of a page against one query cache
pub struct BlockCompiler<'a> {
    queries: &'a dyn QueryCache,
    input: Option<&'a LocalScope>,
}

impl<'a> BlockCompiler<'a> {
    pub fn new(queries: &'a dyn QueryCache) -> Self {
        Self {
            queries,
            input: None,
        }
    }

    /// Prefill form fields with values the user already entered
    pub fn with_input(mut self, input: &'a LocalScope) -> Self {
        self.input = Some(input);
        self
    }

    /// Validate and render a whole page.
    ///
    /// Each call is one root render with its own loop store.
    pub fn render_page(&self, page: &Page) -> Result<Vec<RenderedBlock>, PageError> {
        crate::validation::validate_page(page)?;

        let store = LoopStore::new();
        let context = VariableContext::new(self.queries, &store);
        self.render_blocks(&page.blocks, &context, &store)
    }

    fn render_blocks(
        &self,
        blocks: &[Block],
        context: &VariableContext<'_>,
        store: &LoopStore,
    ) -> Result<Vec<RenderedBlock>, PageError> {
        blocks
            .iter()
            .map(|block| self.render_block(block, context, store))
            .collect()
    }

    fn render_block(
        &self,
        block: &Block,
        context: &VariableContext<'_>,
        store: &LoopStore,
    ) -> Result<RenderedBlock, PageError> {
        let compiler = TemplateCompiler::new(context.clone());

        let rendered = match block {
            Block::Text { content } => RenderedBlock::Text {
                fragments: compiler.compile_template_to_fragments(content, None),
            },
            Block::Loop { id, data, blocks } => {
                let items = match resolve_data(id, data, &compiler) {
                    Ok(items) => items,
                    Err(error) => return Ok(error),
                };

                let iterations = mount(id, items, store)?
                    .into_iter()
                    .map(|element| {
                        let scope = context.with_item(id, element);
                        self.render_blocks(blocks, &scope, store)
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                store.release(id);
                RenderedBlock::Loop {
                    id: id.clone(),
                    iterations,
                }
            }
            Block::Table { id, data, columns } => {
                let items = match resolve_data(id, data, &compiler) {
                    Ok(items) => items,
                    Err(error) => return Ok(error),
                };

                let rows = mount(id, items, store)?
                    .into_iter()
                    .map(|row| render_row(columns, &context.with_item(id, row)))
                    .collect();
                let headers = columns
                    .iter()
                    .map(|column| compiler.compile_template_to_fragments(&column.header, None))
                    .collect();

                store.release(id);
                RenderedBlock::Table {
                    id: id.clone(),
                    headers,
                    rows,
                }
            }
            Block::Form { id, fields, .. } => {
                let empty = LocalScope::new();
                RenderedBlock::Form {
                    id: id.clone(),
                    fields: build_form_data(fields, &compiler, self.input.unwrap_or(&empty)),
                }
            }
        };
        Ok(rendered)
    }

    /// Interpolate a form's action with the submitted values as the `this` scope.
    ///
    /// Unlike rendering, any unresolved token rejects the submission.
    pub fn submit_form(
        &self,
        page: &Page,
        form_id: &str,
        values: &LocalScope,
    ) -> Result<String, FormError> {
        let (action, fields) = find_form(&page.blocks, form_id)
            .ok_or_else(|| FormError::UnknownForm(form_id.to_string()))?;

        if let Some(missing) = fields
            .iter()
            .filter(|field| field.required)
            .find(|field| !has_input(values, &field.name))
        {
            return Err(FormError::MissingField(missing.name.clone()));
        }

        let store = LoopStore::new();
        let compiler = TemplateCompiler::new(VariableContext::new(self.queries, &store));
        Ok(compiler.interpolate_to_string(action, Some(values))?)
    }
}

/// Resolve the array a loop or table iterates over.
///
/// A failure becomes the error block rendered in place of the whole block.
fn resolve_data(
    id: &str,
    data: &str,
    compiler: &TemplateCompiler<'_>,
) -> Result<Vec<Value>, RenderedBlock> {
    let reference = data_reference(data);
    compiler
        .resolver()
        .as_array(reference, None)
        .map_err(|error| RenderedBlock::Error {
            block_id: id.to_string(),
            token: reference.to_string(),
            error,
        })
}

/// Register `items` under `id` for the duration of one mount.
///
/// An id that is still registered belongs to an enclosing loop; reusing it
/// would shadow that loop's content.
fn mount(id: &str, items: Vec<Value>, store: &LoopStore) -> Result<Vec<Value>, PageError> {
    if store.set_variable(id, items) == Registration::AlreadyInitialized {
        return Err(PageError::DuplicateBlockId(id.to_string()));
    }

    Ok(store
        .get(id)
        .as_deref()
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default())
}

fn render_row(columns: &[TableColumn], context: &VariableContext<'_>) -> Vec<Vec<Fragment>> {
    let compiler = TemplateCompiler::new(context.clone());
    columns
        .iter()
        .map(|column| compiler.compile_template_to_fragments(&column.cell, None))
        .collect()
}

fn find_form<'p>(blocks: &'p [Block], form_id: &str) -> Option<(&'p str, &'p [FormField])> {
    blocks.iter().find_map(|block| match block {
        Block::Form { id, action, fields } if id == form_id => Some((action.as_str(), fields.as_slice())),
        _ => None,
    })
}

fn has_input(values: &LocalScope, name: &str) -> bool {
    values
        .get(name)
        .and_then(stringify_value)
        .is_some_and(|value| !value.trim().is_empty())
}
