use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use serde_json::{json, Value};

use watchlist_api::{
    error::{AppError, AppResult},
    models::{MediaCandidate, MediaDetails, MediaType},
    routes::{create_router, AppState},
    services::MediaProvider,
};

/// Serves a tiny fixed catalogue; id "500" simulates a provider outage
struct FakeProvider;

fn catalogue() -> Vec<MediaDetails> {
    vec![
        MediaDetails {
            external_id: "27205".to_string(),
            title: "Inception".to_string(),
            media_type: MediaType::Movie,
            genres: vec!["Action".to_string(), "Science Fiction".to_string()],
            runtime_minutes: Some(148),
            poster_url: Some("https://image.tmdb.org/t/p/w500/inception.jpg".to_string()),
            release_date: Some("2010-07-15".to_string()),
            overview: Some("A thief who steals corporate secrets".to_string()),
        },
        MediaDetails {
            external_id: "1396".to_string(),
            title: "Breaking Bad".to_string(),
            media_type: MediaType::Series,
            genres: vec!["Drama".to_string(), "Crime".to_string()],
            runtime_minutes: Some(45),
            poster_url: None,
            release_date: Some("2008-01-20".to_string()),
            overview: None,
        },
    ]
}

#[async_trait::async_trait]
impl MediaProvider for FakeProvider {
    async fn search(&self, query: &str) -> AppResult<Vec<MediaCandidate>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let query = query.to_lowercase();
        Ok(catalogue()
            .into_iter()
            .filter(|d| d.title.to_lowercase().contains(&query))
            .map(|d| MediaCandidate {
                external_id: d.external_id,
                title: d.title,
                media_type: d.media_type,
                poster_url: d.poster_url,
            })
            .collect())
    }

    async fn fetch_details(
        &self,
        external_id: &str,
        media_type: MediaType,
    ) -> AppResult<Option<MediaDetails>> {
        if external_id == "500" {
            return Err(AppError::UpstreamUnavailable("connection reset".to_string()));
        }

        Ok(catalogue()
            .into_iter()
            .find(|d| d.external_id == external_id && d.media_type == media_type))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

fn create_test_server() -> TestServer {
    let state = AppState::in_memory(Arc::new(FakeProvider), "test-secret");
    let app = create_router(state, &[]);
    TestServer::new(app).unwrap()
}

fn bearer(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

/// Registers and logs in a user, returning the bearer token
async fn sign_up(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": "tester",
            "email": email,
            "password": "hunter22"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": "hunter22" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_watchlist_requires_token() {
    let server = create_test_server();

    let response = server.get("/api/watchlist").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = bearer(server.get("/api/watchlist/stats"), "not-a-token").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_duplicate_and_bad_login() {
    let server = create_test_server();
    sign_up(&server, "dup@example.com").await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": "again",
            "email": "dup@example.com",
            "password": "hunter22"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "dup@example.com", "password": "wrong-password" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_crud_flow() {
    let server = create_test_server();
    let token = sign_up(&server, "crud@example.com").await;

    let response = bearer(server.post("/api/watchlist"), &token)
        .json(&json!({
            "title": "The Matrix",
            "mediaType": "movie",
            "status": "Watched",
            "rating": 9,
            "runtimeMinutes": 136,
            "genres": ["Action", "Science Fiction"]
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["title"], "The Matrix");
    assert_eq!(created["status"], "watched");
    let id = created["id"].as_str().unwrap().to_string();

    let response = bearer(server.get("/api/watchlist"), &token).await;
    response.assert_status_ok();
    let entries: Vec<Value> = response.json();
    assert_eq!(entries.len(), 1);

    let response = bearer(server.put(&format!("/api/watchlist/{}", id)), &token)
        .json(&json!({ "rating": 7.5, "notes": "held up well" }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["rating"], 7.5);
    assert_eq!(updated["notes"], "held up well");
    assert_eq!(updated["runtimeMinutes"], 136);

    let response = bearer(server.get(&format!("/api/watchlist/{}", id)), &token).await;
    response.assert_status_ok();

    let response = bearer(server.delete(&format!("/api/watchlist/{}", id)), &token).await;
    response.assert_status_ok();

    let response = bearer(server.get(&format!("/api/watchlist/{}", id)), &token).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_entries_rejected() {
    let server = create_test_server();
    let token = sign_up(&server, "invalid@example.com").await;

    let response = bearer(server.post("/api/watchlist"), &token)
        .json(&json!({ "title": "Heat", "mediaType": "movie", "rating": 12 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = bearer(server.post("/api/watchlist"), &token)
        .json(&json!({ "title": "Heat", "mediaType": "podcast" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = bearer(server.post("/api/watchlist"), &token)
        .json(&json!({ "mediaType": "movie" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "missing required field: title");
}

#[tokio::test]
async fn test_entries_are_private_to_owner() {
    let server = create_test_server();
    let alice = sign_up(&server, "alice@example.com").await;
    let bob = sign_up(&server, "bob@example.com").await;

    let response = bearer(server.post("/api/watchlist"), &alice)
        .json(&json!({ "title": "Amélie", "mediaType": "movie" }))
        .await;
    let created: Value = response.json();
    let path = format!("/api/watchlist/{}", created["id"].as_str().unwrap());

    bearer(server.get(&path), &bob)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    bearer(server.put(&path), &bob)
        .json(&json!({ "notes": "mine now" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    bearer(server.delete(&path), &bob)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let entries: Vec<Value> = bearer(server.get("/api/watchlist"), &bob).await.json();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_malformed_entry_id_returns_json_error() {
    let server = create_test_server();
    let token = sign_up(&server, "badid@example.com").await;

    for response in [
        bearer(server.get("/api/watchlist/not-a-uuid"), &token).await,
        bearer(server.put("/api/watchlist/not-a-uuid"), &token)
            .json(&json!({ "notes": "x" }))
            .await,
        bearer(server.delete("/api/watchlist/not-a-uuid"), &token).await,
    ] {
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_fetch_and_add() {
    let server = create_test_server();
    let alice = sign_up(&server, "fetch@example.com").await;
    let bob = sign_up(&server, "fetch-bob@example.com").await;

    let request = json!({
        "title": "Breaking Bad",
        "mediaType": "tv",
        "externalId": 1396,
        "status": "Watching",
        "comment": "season 2"
    });

    let response = bearer(server.post("/api/watchlist/fetch-and-add"), &alice)
        .json(&request)
        .await;
    response.assert_status(StatusCode::CREATED);
    let entry: Value = response.json();
    assert_eq!(entry["mediaType"], "series");
    assert_eq!(entry["externalId"], "1396");
    assert_eq!(entry["genres"], json!(["Drama", "Crime"]));
    assert_eq!(entry["runtimeMinutes"], 45);
    assert_eq!(entry["notes"], "season 2");

    let response = bearer(server.post("/api/watchlist/fetch-and-add"), &alice)
        .json(&request)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = bearer(server.post("/api/watchlist/fetch-and-add"), &bob)
        .json(&request)
        .await;
    response.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_fetch_and_add_failures() {
    let server = create_test_server();
    let token = sign_up(&server, "failures@example.com").await;

    let response = bearer(server.post("/api/watchlist/fetch-and-add"), &token)
        .json(&json!({ "title": "Inception", "mediaType": "movie" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "missing required field: externalId");

    let response = bearer(server.post("/api/watchlist/fetch-and-add"), &token)
        .json(&json!({ "title": "Nothing", "mediaType": "movie", "externalId": "1" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = bearer(server.post("/api/watchlist/fetch-and-add"), &token)
        .json(&json!({ "title": "Outage", "mediaType": "movie", "externalId": "500" }))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "upstream provider unavailable");
}

#[tokio::test]
async fn test_enriched_manual_entry() {
    let server = create_test_server();
    let token = sign_up(&server, "enrich@example.com").await;

    let response = bearer(server.post("/api/watchlist"), &token)
        .json(&json!({ "title": "inception", "enrich": true }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let entry: Value = response.json();
    assert_eq!(entry["title"], "inception");
    assert_eq!(entry["mediaType"], "movie");
    assert_eq!(entry["externalId"], "27205");
    assert_eq!(entry["runtimeMinutes"], 148);
}

#[tokio::test]
async fn test_empty_stats_have_fixed_shape() {
    let server = create_test_server();
    let token = sign_up(&server, "empty@example.com").await;

    let response = bearer(server.get("/api/watchlist/stats"), &token).await;
    response.assert_status_ok();
    let stats: Value = response.json();

    assert_eq!(
        stats,
        json!({
            "totalWatchTime": 0,
            "averageRating": 0.0,
            "genreCounts": {},
            "topGenres": [],
            "typeCounts": {},
            "ratingDistribution": { "0–4": 0, "5–6": 0, "7–8": 0, "9–10": 0 },
            "statusCounts": {}
        })
    );
}

#[tokio::test]
async fn test_stats_scenario() {
    let server = create_test_server();
    let token = sign_up(&server, "stats@example.com").await;

    for body in [
        json!({
            "title": "Mad Max: Fury Road",
            "mediaType": "movie",
            "status": "watched",
            "rating": 7,
            "runtimeMinutes": 120,
            "genres": ["Action", "Drama"]
        }),
        json!({
            "title": "Abbott Elementary",
            "mediaType": "tv",
            "status": "watching",
            "runtimeMinutes": 45,
            "genres": ["Comedy"]
        }),
    ] {
        bearer(server.post("/api/watchlist"), &token)
            .json(&body)
            .await
            .assert_status(StatusCode::CREATED);
    }

    let stats: Value = bearer(server.get("/api/watchlist/stats"), &token)
        .await
        .json();

    assert_eq!(stats["totalWatchTime"], 165);
    assert_eq!(stats["averageRating"], 7.0);
    assert_eq!(
        stats["genreCounts"],
        json!({ "Action": 1, "Drama": 1, "Comedy": 1 })
    );
    assert_eq!(stats["topGenres"], json!(["Action", "Drama", "Comedy"]));
    assert_eq!(stats["typeCounts"], json!({ "movie": 1, "series": 1 }));
    assert_eq!(
        stats["ratingDistribution"],
        json!({ "0–4": 0, "5–6": 0, "7–8": 1, "9–10": 0 })
    );
    assert_eq!(stats["statusCounts"], json!({ "watched": 1, "watching": 1 }));
}

#[tokio::test]
async fn test_media_search() {
    let server = create_test_server();

    let response = server
        .get("/api/media/search")
        .add_query_param("q", "bad")
        .await;
    response.assert_status_ok();
    let results: Vec<Value> = response.json();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["externalId"], "1396");
    assert_eq!(results[0]["mediaType"], "series");

    let response = server.get("/api/media/search").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
