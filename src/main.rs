use std::sync::Arc;

use anyhow::Context;
use page_compiler::{config::AppConfig, create_router, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("page_compiler=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_args();
    let state = Arc::new(AppState::load(&config)?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Could not bind to {}", config.bind))?;

    tracing::info!("Listening on http://{}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
