pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod services;
pub mod validation;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use config::{load_queries, AppConfig, PageCatalog};
use services::{InMemoryQueryCache, PageService};

/// Largest request body accepted, query results included
const MAX_BODY_BYTES: usize = 1024 * 1024;

// Application state
pub struct AppState {
    pub pages: PageService,
}

impl AppState {
    pub fn new(pages: PageService) -> Self {
        Self { pages }
    }

    /// Load pages and seed the query cache as configured.
    ///
    /// Queries from the queries file override those seeded by page definitions.
    pub fn load(config: &AppConfig) -> anyhow::Result<Self> {
        let PageCatalog { pages, mut queries } = PageCatalog::load(config.pages_path.as_deref())?;
        queries.extend(load_queries(&config.queries_path)?);

        let cache = Arc::new(InMemoryQueryCache::from_snapshot(queries));
        Ok(Self::new(PageService::new(pages, cache)))
    }
}

// Public function to create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages
        .route("/", get(handlers::pages::index))
        .route("/pages/{id}", get(handlers::pages::show_page))
        .route("/pages/{id}/forms/{form_id}", post(handlers::pages::submit_form))

        // JSON API
        .route("/api/pages/{id}", get(handlers::api::get_page))
        .route("/api/interpolate", post(handlers::api::interpolate))
        .route("/api/fragments", post(handlers::api::fragments))
        .route("/api/queries", get(handlers::api::export_queries))
        .route(
            "/api/queries/{key}",
            put(handlers::api::put_query).delete(handlers::api::delete_query),
        )

        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
