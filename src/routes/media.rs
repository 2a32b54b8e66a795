use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{error::AppResult, models::MediaCandidate, routes::AppState};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// Handler for title search against the media provider
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<MediaCandidate>>> {
    let candidates = state.watchlist.provider().search(&params.q).await?;
    Ok(Json(candidates))
}
