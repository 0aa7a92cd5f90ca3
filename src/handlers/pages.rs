// Page handlers for / and /pages/{id} routes

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};

use crate::{
    domain::{
        blocks::{FormVariable, RenderedBlock},
        template::{Fragment, LocalScope},
    },
    error::AppError,
    handlers::common::render_fragments,
    AppState,
};

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    pages: Vec<PageSummary>,
}

struct PageSummary {
    id: String,
    title: String,
    block_count: usize,
}

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate {
    id: String,
    title: String,
    blocks: Vec<String>,
}

#[derive(Template)]
#[template(path = "blocks/text.html")]
struct TextBlockTemplate {
    content: String,
}

#[derive(Template)]
#[template(path = "blocks/loop.html")]
struct LoopBlockTemplate<'a> {
    id: &'a str,
    iterations: Vec<String>,
}

#[derive(Template)]
#[template(path = "blocks/table.html")]
struct TableBlockTemplate<'a> {
    id: &'a str,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

#[derive(Template)]
#[template(path = "blocks/form.html")]
struct FormBlockTemplate<'a> {
    page_id: &'a str,
    id: &'a str,
    fields: Vec<FormFieldDisplay>,
}

struct FormFieldDisplay {
    name: String,
    label: String,
    is_required: bool,
    value: String,
    has_error: bool,
    error: String,
}

impl From<&FormVariable> for FormFieldDisplay {
    fn from(field: &FormVariable) -> Self {
        let error = field
            .fragments
            .iter()
            .find_map(|fragment| match fragment {
                Fragment::Error { token, error } => {
                    Some(format!("{}: {}", token, error.code()))
                }
                _ => None,
            })
            .unwrap_or_default();

        FormFieldDisplay {
            name: field.name.clone(),
            label: field.label.clone(),
            is_required: field.is_required,
            value: field.input_value(),
            has_error: field.has_error(),
            error,
        }
    }
}

#[derive(Template)]
#[template(path = "blocks/error.html")]
struct ErrorBlockTemplate<'a> {
    block_id: &'a str,
    token: &'a str,
    code: &'static str,
    message: String,
}

/// Query string values become the `this` scope forms are prefilled with
pub(crate) fn input_from_params(params: HashMap<String, String>) -> LocalScope {
    params
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect()
}

fn render_block_html(block: &RenderedBlock, page_id: &str) -> Result<String, AppError> {
    let html = match block {
        RenderedBlock::Text { fragments } => TextBlockTemplate {
            content: render_fragments(fragments)?,
        }
        .render()?,
        RenderedBlock::Loop { id, iterations } => {
            let iterations = iterations
                .iter()
                .map(|blocks| render_blocks_html(blocks, page_id).map(|html| html.join("\n")))
                .collect::<Result<Vec<_>, _>>()?;
            LoopBlockTemplate { id, iterations }.render()?
        }
        RenderedBlock::Table { id, headers, rows } => {
            let headers = headers
                .iter()
                .map(|header| render_fragments(header))
                .collect::<Result<Vec<_>, _>>()?;
            let rows = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| render_fragments(cell))
                        .collect::<Result<Vec<_>, _>>()
                })
                .collect::<Result<Vec<_>, _>>()?;
            TableBlockTemplate { id, headers, rows }.render()?
        }
        RenderedBlock::Form { id, fields } => FormBlockTemplate {
            page_id,
            id,
            fields: fields.iter().map(FormFieldDisplay::from).collect(),
        }
        .render()?,
        RenderedBlock::Error {
            block_id,
            token,
            error,
        } => ErrorBlockTemplate {
            block_id,
            token,
            code: error.code(),
            message: error.to_string(),
        }
        .render()?,
    };
    Ok(html)
}

fn render_blocks_html(blocks: &[RenderedBlock], page_id: &str) -> Result<Vec<String>, AppError> {
    blocks
        .iter()
        .map(|block| render_block_html(block, page_id))
        .collect()
}

// GET / - List loaded pages
pub async fn index(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let pages = state
        .pages
        .pages()
        .map(|page| PageSummary {
            id: page.id.clone(),
            title: page.title.clone(),
            block_count: page.blocks.len(),
        })
        .collect();

    let template = IndexTemplate { pages };
    Ok(Html(template.render()?))
}

// GET /pages/{id} - Render a page, prefilling forms from the query string
pub async fn show_page(
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let input = input_from_params(params);
    let page = state.pages.render(&id, &input)?;

    let template = PageTemplate {
        blocks: render_blocks_html(&page.blocks, &page.id)?,
        id: page.id,
        title: page.title,
    };
    Ok(Html(template.render()?))
}

// POST /pages/{id}/forms/{form_id} - Submit form values, returns the action
pub async fn submit_form(
    Path((id, form_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(values): Json<LocalScope>,
) -> Result<Response, AppError> {
    let action = state.pages.submit_form(&id, &form_id, &values)?;

    // Return the action as plain text for the page script to navigate to
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], action).into_response())
}
