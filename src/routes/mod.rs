use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::Duration;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    db::{AccountStore, MemoryAccountStore, MemoryWatchlistStore, WatchlistStore},
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{CredentialService, MediaProvider, WatchlistService},
};

pub mod auth;
pub mod media;
pub mod watchlist;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub watchlist: WatchlistService,
    pub credentials: CredentialService,
}

impl AppState {
    pub fn new(
        entries: Arc<dyn WatchlistStore>,
        accounts: Arc<dyn AccountStore>,
        provider: Arc<dyn MediaProvider>,
        jwt_secret: &str,
        token_ttl: Duration,
    ) -> Self {
        Self {
            watchlist: WatchlistService::new(entries, provider),
            credentials: CredentialService::new(accounts, jwt_secret, token_ttl),
        }
    }

    /// State over empty in-memory stores
    pub fn in_memory(provider: Arc<dyn MediaProvider>, jwt_secret: &str) -> Self {
        Self::new(
            Arc::new(MemoryWatchlistStore::new()),
            Arc::new(MemoryAccountStore::new()),
            provider,
            jwt_secret,
            Duration::days(7),
        )
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .with_state(state)
        // Outermost first: request ids must exist before the trace span is made
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(allowed_origins))
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}

/// API routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/media/search", get(media::search))
        .route(
            "/watchlist",
            get(watchlist::list_entries).post(watchlist::create_entry),
        )
        .route("/watchlist/stats", get(watchlist::stats))
        .route("/watchlist/fetch-and-add", post(watchlist::fetch_and_add))
        .route(
            "/watchlist/:id",
            get(watchlist::get_entry)
                .put(watchlist::update_entry)
                .delete(watchlist::delete_entry),
        )
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
