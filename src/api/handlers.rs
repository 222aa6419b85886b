use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::{
    ContentItem, FeedFilter, FeedLoadOutcome, FeedStatus, ItemId, RegionLayout,
    RelatedLoadOutcome, ScrollMetrics, ScrollRegion, SessionSnapshot,
};

use super::AppState;

// Request types

/// Query string for `GET /feed`; `tags` is comma-separated
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub tags: Option<String>,
    pub q: Option<String>,
}

impl From<FeedQuery> for FeedFilter {
    fn from(query: FeedQuery) -> Self {
        let tags = query
            .tags
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            tags,
            query: query.q,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoadFeedRequest {
    pub layout: Option<RegionLayout>,
}

#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    pub item_id: ItemId,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Feed items in display order, optionally filtered
pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Json<Vec<ContentItem>> {
    let filter = FeedFilter::from(query);
    Json(state.engine.items(&filter).await)
}

pub async fn get_feed_status(State(state): State<AppState>) -> Json<FeedStatus> {
    Json(state.engine.feed_status().await)
}

pub async fn get_feed_tags(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.engine.tags().await)
}

/// Appends the next feed batch; a no-op while a load is in flight
pub async fn load_feed(
    State(state): State<AppState>,
    request: Option<Json<LoadFeedRequest>>,
) -> AppResult<Json<FeedLoadOutcome>> {
    let layout = request.and_then(|Json(request)| request.layout);
    if let Some(layout) = &layout {
        if layout.viewport_size <= 0.0 || layout.item_extent <= 0.0 {
            return Err(AppError::InvalidInput(
                "layout sizes must be positive".to_string(),
            ));
        }
    }

    Ok(Json(state.engine.load_more(layout).await))
}

/// Opens a detail session on a feed item
pub async fn open_session(
    State(state): State<AppState>,
    Json(request): Json<ItemRequest>,
) -> AppResult<(StatusCode, Json<SessionSnapshot>)> {
    let snapshot = state.engine.open(&request.item_id).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

pub async fn get_session(State(state): State<AppState>) -> AppResult<Json<SessionSnapshot>> {
    state
        .engine
        .session()
        .await
        .map(Json)
        .ok_or(AppError::NoActiveSession)
}

pub async fn select_item(
    State(state): State<AppState>,
    Json(request): Json<ItemRequest>,
) -> AppResult<Json<SessionSnapshot>> {
    Ok(Json(state.engine.select(&request.item_id).await?))
}

/// Steps back; `{"closed": true}` once the history is exhausted
pub async fn go_back(State(state): State<AppState>) -> AppResult<Json<Value>> {
    match state.engine.back().await? {
        Some(snapshot) => Ok(Json(json!({ "closed": false, "session": snapshot }))),
        None => Ok(Json(json!({ "closed": true }))),
    }
}

pub async fn close_session(State(state): State<AppState>) -> StatusCode {
    state.engine.close().await;
    StatusCode::NO_CONTENT
}

pub async fn load_related(
    State(state): State<AppState>,
) -> AppResult<Json<RelatedLoadOutcome>> {
    match state.engine.load_more_related().await {
        RelatedLoadOutcome::NoSession => Err(AppError::NoActiveSession),
        outcome => Ok(Json(outcome)),
    }
}

/// Forwards a scroll event to the region's trigger
pub async fn report_scroll(
    State(state): State<AppState>,
    Path(region): Path<ScrollRegion>,
    Json(metrics): Json<ScrollMetrics>,
) -> AppResult<StatusCode> {
    if metrics.viewport_size <= 0.0 {
        return Err(AppError::InvalidInput(
            "viewport_size must be positive".to_string(),
        ));
    }

    if state.triggers.lock().await.report(region, metrics) {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(AppError::NotFound(format!("no trigger bound to region {}", region)))
    }
}
