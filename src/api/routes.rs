use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Feed
        .route("/feed", get(handlers::get_feed))
        .route("/feed/status", get(handlers::get_feed_status))
        .route("/feed/tags", get(handlers::get_feed_tags))
        .route("/feed/load", post(handlers::load_feed))
        // Detail session
        .route(
            "/session",
            get(handlers::get_session)
                .post(handlers::open_session)
                .delete(handlers::close_session),
        )
        .route("/session/select", post(handlers::select_item))
        .route("/session/back", post(handlers::go_back))
        .route("/session/related/load", post(handlers::load_related))
        // Scroll events
        .route("/regions/:region/scroll", post(handlers::report_scroll))
        .with_state(state)
}
