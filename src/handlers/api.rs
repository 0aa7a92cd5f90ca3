// JSON API handlers for /api routes

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::{collections::HashMap, sync::Arc};

use crate::{
    domain::template::LocalScope,
    error::AppError,
    handlers::pages::input_from_params,
    services::serializers::serializer_for,
    AppState,
};

#[derive(Deserialize)]
pub struct TemplateRequest {
    pub template: String,
    /// Values for the `this` namespace
    #[serde(default)]
    pub local: Option<LocalScope>,
}

#[derive(Deserialize)]
pub struct ExportParams {
    format: Option<String>,
}

// GET /api/pages/{id} - Rendered block tree as JSON
pub async fn get_page(
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.pages.render(&id, &input_from_params(params))?;
    Ok(Json(page))
}

// POST /api/interpolate - Strict interpolation, 422 on the first unresolved token
pub async fn interpolate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TemplateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = state.pages.interpolate(&request.template, request.local)?;
    Ok(Json(json!({ "result": result })))
}

// POST /api/fragments - Tolerant compilation, errors stay inline
pub async fn fragments(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TemplateRequest>,
) -> impl IntoResponse {
    let fragments = state.pages.compile(&request.template, request.local);
    Json(json!({ "fragments": fragments }))
}

// GET /api/queries - Export the query cache as YAML or JSON
pub async fn export_queries(
    Query(params): Query<ExportParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let serializer = serializer_for(params.format.as_deref().unwrap_or("json"));
    let body = serializer
        .serialize(&state.pages.cache().snapshot())
        .map_err(|e| AppError::Internal(format!("Could not export queries: {}", e)))?;

    Ok(([(header::CONTENT_TYPE, serializer.content_type())], body).into_response())
}

// PUT /api/queries/{key} - Replace a query result
pub async fn put_query(
    Path(key): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(data): Json<Value>,
) -> impl IntoResponse {
    let replaced = state.pages.cache().put(&key, data).is_some();
    tracing::debug!(key = %key, replaced, "Stored query result");

    let status = if replaced {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    (status, Json(json!({ "key": key, "replaced": replaced })))
}

// DELETE /api/queries/{key} - Forget a query result
pub async fn delete_query(
    Path(key): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    state
        .pages
        .cache()
        .remove(&key)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| AppError::NotFound(format!("Unknown query: '{}'", key)))
}
