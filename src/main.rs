use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use watchlist_api::{
    config::Config,
    db::{
        create_pool, run_migrations, AccountStore, MemoryAccountStore, MemoryWatchlistStore,
        PgAccountStore, PgWatchlistStore, WatchlistStore,
    },
    routes::{create_router, AppState},
    services::{DisabledProvider, MediaProvider, TmdbProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "watchlist_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let (entries, accounts): (Arc<dyn WatchlistStore>, Arc<dyn AccountStore>) =
        match &config.database_url {
            Some(database_url) => {
                let pool = create_pool(database_url).await?;
                run_migrations(&pool).await?;
                tracing::info!("Connected to PostgreSQL");
                (
                    Arc::new(PgWatchlistStore::new(pool.clone())),
                    Arc::new(PgAccountStore::new(pool)),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory stores");
                (
                    Arc::new(MemoryWatchlistStore::new()),
                    Arc::new(MemoryAccountStore::new()),
                )
            }
        };

    let provider: Arc<dyn MediaProvider> = match &config.tmdb_api_key {
        Some(api_key) => Arc::new(TmdbProvider::new(
            api_key.clone(),
            config.tmdb_api_url.clone(),
            config.tmdb_image_base_url.clone(),
        )),
        None => {
            tracing::warn!("TMDB_API_KEY not set, media lookups are disabled");
            Arc::new(DisabledProvider)
        }
    };

    let state = AppState::new(
        entries,
        accounts,
        provider,
        &config.jwt_secret,
        config.token_ttl()?,
    );
    let app = create_router(state, &config.allowed_origins());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
