use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{AccountView, AuthResponse, LoginRequest, RegisterRequest},
    routes::AppState,
};

/// Handler for account registration
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<AccountView>)> {
    let Json(request) = payload?;
    let account = state.credentials.register(request).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// Handler for login; returns a bearer token
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<AuthResponse>> {
    let Json(request) = payload?;
    let response = state.credentials.login(request).await?;
    Ok(Json(response))
}
