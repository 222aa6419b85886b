use std::sync::Arc;

use anyhow::Context;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use discovery_feed::{
    api::{create_router, AppState},
    config::Config,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{enrich_catalog, ContentCatalog, DiscoveryEngine, FileMetadata},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "discovery_feed=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let settings = config.engine_settings();

    let mut catalog = match &config.catalog_path {
        Some(path) => ContentCatalog::from_json_file(path)?,
        None => ContentCatalog::builtin(),
    };

    if let Some(path) = &config.metadata_path {
        let source = FileMetadata::from_json_file(path)?;
        enrich_catalog(&mut catalog, &source).await;
    }

    let engine = DiscoveryEngine::new(Arc::new(catalog), &settings);
    engine.spawn_preload();

    let state = AppState::new(engine, settings.trigger);

    let app = create_router(state).layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
            .layer(CorsLayer::permissive()),
    );

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
