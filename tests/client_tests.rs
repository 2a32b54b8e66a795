use std::sync::Arc;

use tokio::net::TcpListener;

use watchlist_api::{
    client::ApiClient,
    error::AppError,
    models::{CreateEntryRequest, MediaType, RegisterRequest, UpdateEntryRequest, WatchStatus},
    routes::{create_router, AppState},
    services::DisabledProvider,
};

async fn spawn_server() -> String {
    let state = AppState::in_memory(Arc::new(DisabledProvider), "client-secret");
    let app = create_router(state, &[]);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_session_lifecycle() {
    let client = ApiClient::new(spawn_server().await);

    let account = client
        .register(&RegisterRequest {
            username: "viewer".to_string(),
            email: "Viewer@Example.com".to_string(),
            password: "popcorn".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(account.email, "viewer@example.com");

    let session = client.login("viewer@example.com", "popcorn").await.unwrap();
    assert_eq!(session.user().id, account.id);
    assert!(!session.token().is_empty());

    let entry = client
        .create(
            &session,
            &CreateEntryRequest {
                title: "Arrival".to_string(),
                media_type: Some(MediaType::Movie),
                status: Some(WatchStatus::Watched),
                rating: Some(8.5),
                runtime_minutes: Some(116),
                genres: vec!["Drama".to_string(), "Science Fiction".to_string()],
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let updated = client
        .update(
            &session,
            entry.id,
            &UpdateEntryRequest {
                notes: Some("rewatch soon".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.notes, "rewatch soon");
    assert_eq!(updated.rating, Some(8.5));

    let stats = client.stats(&session).await.unwrap();
    assert_eq!(stats.total_watch_time, 116);
    assert_eq!(stats.average_rating, 8.5);
    assert_eq!(stats.top_genres, vec!["Drama", "Science Fiction"]);
    assert_eq!(stats.rating_distribution.high, 1);

    client.delete(&session, entry.id).await.unwrap();
    assert!(client.list(&session).await.unwrap().is_empty());

    client.logout(session);
}

#[tokio::test]
async fn test_client_maps_error_statuses() {
    let client = ApiClient::new(spawn_server().await);

    let result = client.login("nobody@example.com", "whatever").await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));

    client
        .register(&RegisterRequest {
            username: "viewer".to_string(),
            email: "viewer@example.com".to_string(),
            password: "popcorn".to_string(),
        })
        .await
        .unwrap();
    let session = client.login("viewer@example.com", "popcorn").await.unwrap();

    let missing = client.get(&session, uuid::Uuid::new_v4()).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let invalid = client
        .create(
            &session,
            &CreateEntryRequest {
                title: "Untyped".to_string(),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(invalid, Err(AppError::InvalidInput(_))));

    // Disabled provider surfaces as a server error
    let search = client.search("arrival").await;
    assert!(matches!(search, Err(AppError::UpstreamUnavailable(_))));
}
