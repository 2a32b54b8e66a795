use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::{AuthUser, RequestId},
    models::{
        CreateEntryRequest, FetchAndAddRequest, UpdateEntryRequest, WatchEntry, WatchlistStats,
    },
    routes::AppState,
};

/// `GET /watchlist`
pub async fn list_entries(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<WatchEntry>>> {
    let entries = state.watchlist.list(user.id()).await?;
    Ok(Json(entries))
}

/// `GET /watchlist/:id`
pub async fn get_entry(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<WatchEntry>> {
    let Path(id) = path?;
    let entry = state.watchlist.get(user.id(), id).await?;
    Ok(Json(entry))
}

/// `GET /watchlist/stats`
pub async fn stats(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    user: AuthUser,
) -> AppResult<Json<WatchlistStats>> {
    let stats = state.watchlist.stats(user.id()).await?;

    tracing::info!(
        request_id = %request_id,
        owner = %user.id(),
        total_watch_time = stats.total_watch_time,
        genres = stats.genre_counts.len(),
        "Watchlist stats computed"
    );

    Ok(Json(stats))
}

/// `POST /watchlist`
pub async fn create_entry(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<WatchEntry>)> {
    let Json(request) = payload?;
    let entry = state.watchlist.create(user.id(), request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `POST /watchlist/fetch-and-add`
pub async fn fetch_and_add(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    user: AuthUser,
    payload: Result<Json<FetchAndAddRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<WatchEntry>)> {
    let Json(request) = payload?;

    tracing::info!(
        request_id = %request_id,
        owner = %user.id(),
        external_id = request.external_id.as_deref().unwrap_or(""),
        "Processing fetch-and-add request"
    );

    let entry = state.watchlist.fetch_and_add(user.id(), request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `PUT /watchlist/:id`
pub async fn update_entry(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateEntryRequest>, JsonRejection>,
) -> AppResult<Json<WatchEntry>> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    let entry = state.watchlist.update(user.id(), id, patch).await?;
    Ok(Json(entry))
}

/// `DELETE /watchlist/:id`
pub async fn delete_entry(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Value>> {
    let Path(id) = path?;
    state.watchlist.delete(user.id(), id).await?;
    Ok(Json(json!({ "message": "Item deleted" })))
}
