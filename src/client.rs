//! Typed client for the watchlist API.
//!
//! Authentication state lives in an explicit [`Session`] returned by
//! [`ApiClient::login`] and passed to every authenticated call.

use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        AccountView, AuthResponse, CreateEntryRequest, FetchAndAddRequest, LoginRequest,
        MediaCandidate, RegisterRequest, UpdateEntryRequest, WatchEntry, WatchlistStats,
    },
};

/// A logged-in user's credentials
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    user: AccountView,
}

impl Session {
    pub fn user(&self) -> &AccountView {
        &self.user
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct ApiClient {
    http_client: HttpClient,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:5001`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
        builder.bearer_auth(&session.token)
    }

    pub async fn register(&self, request: &RegisterRequest) -> AppResult<AccountView> {
        let response = self
            .http_client
            .post(self.url("/auth/register"))
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    /// Starts a session
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        let response = self
            .http_client
            .post(self.url("/auth/login"))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let AuthResponse { token, user } = decode(response).await?;
        tracing::debug!(account_id = %user.id, "Session started");
        Ok(Session { token, user })
    }

    /// Ends a session. Tokens are stateless, so this only drops the credentials.
    pub fn logout(&self, session: Session) {
        tracing::debug!(account_id = %session.user.id, "Session ended");
    }

    pub async fn search(&self, query: &str) -> AppResult<Vec<MediaCandidate>> {
        let response = self
            .http_client
            .get(self.url("/media/search"))
            .query(&[("q", query)])
            .send()
            .await?;
        decode(response).await
    }

    pub async fn list(&self, session: &Session) -> AppResult<Vec<WatchEntry>> {
        let request = self.http_client.get(self.url("/watchlist"));
        decode(self.authed(request, session).send().await?).await
    }

    pub async fn get(&self, session: &Session, id: Uuid) -> AppResult<WatchEntry> {
        let request = self.http_client.get(self.url(&format!("/watchlist/{}", id)));
        decode(self.authed(request, session).send().await?).await
    }

    pub async fn stats(&self, session: &Session) -> AppResult<WatchlistStats> {
        let request = self.http_client.get(self.url("/watchlist/stats"));
        decode(self.authed(request, session).send().await?).await
    }

    pub async fn create(
        &self,
        session: &Session,
        entry: &CreateEntryRequest,
    ) -> AppResult<WatchEntry> {
        let request = self.http_client.post(self.url("/watchlist")).json(entry);
        decode(self.authed(request, session).send().await?).await
    }

    pub async fn fetch_and_add(
        &self,
        session: &Session,
        request: &FetchAndAddRequest,
    ) -> AppResult<WatchEntry> {
        let builder = self
            .http_client
            .post(self.url("/watchlist/fetch-and-add"))
            .json(request);
        decode(self.authed(builder, session).send().await?).await
    }

    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        patch: &UpdateEntryRequest,
    ) -> AppResult<WatchEntry> {
        let request = self
            .http_client
            .put(self.url(&format!("/watchlist/{}", id)))
            .json(patch);
        decode(self.authed(request, session).send().await?).await
    }

    pub async fn delete(&self, session: &Session, id: Uuid) -> AppResult<()> {
        let request = self
            .http_client
            .delete(self.url(&format!("/watchlist/{}", id)));
        let response = self.authed(request, session).send().await?;
        decode::<serde_json::Value>(response).await.map(|_| ())
    }
}

/// Maps API error bodies back onto `AppError`
async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };

    Err(match status {
        StatusCode::BAD_REQUEST => AppError::InvalidInput(message),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        _ => AppError::UpstreamUnavailable(format!("server returned {}: {}", status, message)),
    })
}
