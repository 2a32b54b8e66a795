use axum::{async_trait, extract::FromRequestParts, http::request::Parts, RequestPartsExt};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::{error::AppError, models::Account, routes::AppState};

/// The caller resolved from a valid `Authorization: Bearer` token.
///
/// Adding this extractor to a handler makes the route require authentication;
/// missing, malformed, expired or orphaned tokens are rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Account);

impl AuthUser {
    /// Owner id for watchlist operations
    pub fn id(&self) -> Uuid {
        self.0.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Unauthorized("missing authorization token".to_string()))?;

        let account = state.credentials.authenticate(bearer.token()).await?;
        Ok(AuthUser(account))
    }
}
