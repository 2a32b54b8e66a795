use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    db::store::{AccountStore, WatchlistStore},
    error::{AppError, AppResult},
    models::{Account, MediaType, NewWatchEntry, WatchEntry},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

const ENTRY_COLUMNS: &str = "id, owner_id, title, media_type, status, rating, runtime_minutes, \
     genres, tags, notes, external_id, poster_url, release_date, overview, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct WatchEntryRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    media_type: String,
    status: String,
    rating: Option<f64>,
    runtime_minutes: Option<i32>,
    genres: Vec<String>,
    tags: Vec<String>,
    notes: String,
    external_id: Option<String>,
    poster_url: Option<String>,
    release_date: Option<String>,
    overview: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WatchEntryRow> for WatchEntry {
    type Error = AppError;

    fn try_from(row: WatchEntryRow) -> Result<Self, Self::Error> {
        Ok(WatchEntry {
            id: row.id,
            owner: row.owner_id,
            title: row.title,
            media_type: row.media_type.parse()?,
            status: row.status.parse()?,
            rating: row.rating,
            runtime_minutes: row.runtime_minutes.and_then(|m| u32::try_from(m).ok()),
            genres: row.genres,
            tags: row.tags,
            notes: row.notes,
            external_id: row.external_id,
            poster_url: row.poster_url,
            release_date: row.release_date,
            overview: row.overview,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn runtime_column(runtime: Option<u32>) -> Option<i32> {
    runtime.map(|m| i32::try_from(m).unwrap_or(i32::MAX))
}

/// Maps a unique-index violation to `AppError::Duplicate`
fn map_unique_violation(error: sqlx::Error, message: &str) -> AppError {
    match &error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            AppError::Duplicate(message.to_string())
        }
        _ => AppError::Database(error),
    }
}

/// Watchlist store backed by the `watch_entries` table
#[derive(Clone)]
pub struct PgWatchlistStore {
    pool: PgPool,
}

impl PgWatchlistStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl WatchlistStore for PgWatchlistStore {
    async fn list_by_owner(&self, owner: Uuid) -> AppResult<Vec<WatchEntry>> {
        let rows: Vec<WatchEntryRow> = sqlx::query_as(&format!(
            "SELECT {ENTRY_COLUMNS} FROM watch_entries WHERE owner_id = $1 ORDER BY seq DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(WatchEntry::try_from).collect()
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> AppResult<Option<WatchEntry>> {
        let row: Option<WatchEntryRow> = sqlx::query_as(&format!(
            "SELECT {ENTRY_COLUMNS} FROM watch_entries WHERE owner_id = $1 AND id = $2"
        ))
        .bind(owner)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(WatchEntry::try_from).transpose()
    }

    async fn find_by_external_id(
        &self,
        owner: Uuid,
        media_type: MediaType,
        external_id: &str,
    ) -> AppResult<Option<WatchEntry>> {
        let row: Option<WatchEntryRow> = sqlx::query_as(&format!(
            "SELECT {ENTRY_COLUMNS} FROM watch_entries \
             WHERE owner_id = $1 AND media_type = $2 AND external_id = $3"
        ))
        .bind(owner)
        .bind(media_type.as_str())
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(WatchEntry::try_from).transpose()
    }

    async fn insert(&self, entry: NewWatchEntry) -> AppResult<WatchEntry> {
        let row: WatchEntryRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO watch_entries (
                id, owner_id, title, media_type, status, rating, runtime_minutes,
                genres, tags, notes, external_id, poster_url, release_date, overview
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(entry.owner)
        .bind(&entry.title)
        .bind(entry.media_type.as_str())
        .bind(entry.status.as_str())
        .bind(entry.rating)
        .bind(runtime_column(entry.runtime_minutes))
        .bind(&entry.genres)
        .bind(&entry.tags)
        .bind(&entry.notes)
        .bind(&entry.external_id)
        .bind(&entry.poster_url)
        .bind(&entry.release_date)
        .bind(&entry.overview)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "title already exists in watchlist"))?;

        row.try_into()
    }

    async fn update(&self, entry: WatchEntry) -> AppResult<Option<WatchEntry>> {
        let row: Option<WatchEntryRow> = sqlx::query_as(&format!(
            r#"
            UPDATE watch_entries
            SET title = $3, media_type = $4, status = $5, rating = $6, runtime_minutes = $7,
                genres = $8, tags = $9, notes = $10, external_id = $11, poster_url = $12,
                release_date = $13, overview = $14, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(entry.id)
        .bind(entry.owner)
        .bind(&entry.title)
        .bind(entry.media_type.as_str())
        .bind(entry.status.as_str())
        .bind(entry.rating)
        .bind(runtime_column(entry.runtime_minutes))
        .bind(&entry.genres)
        .bind(&entry.tags)
        .bind(&entry.notes)
        .bind(&entry.external_id)
        .bind(&entry.poster_url)
        .bind(&entry.release_date)
        .bind(&entry.overview)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "title already exists in watchlist"))?;

        row.map(WatchEntry::try_from).transpose()
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM watch_entries WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

/// Account store backed by the `accounts` table
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: Account) -> AppResult<Account> {
        let row: AccountRow = sqlx::query_as(
            r#"
            INSERT INTO accounts (id, username, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "user already exists"))?;

        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, username, email, password_hash, created_at FROM accounts WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, username, email, password_hash, created_at FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Account::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_with_unknown_status_is_rejected() {
        let row = WatchEntryRow {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Heat".to_string(),
            media_type: "movie".to_string(),
            status: "abandoned".to_string(),
            rating: None,
            runtime_minutes: Some(170),
            genres: vec![],
            tags: vec![],
            notes: String::new(),
            external_id: None,
            poster_url: None,
            release_date: None,
            overview: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(WatchEntry::try_from(row).is_err());
    }

    #[test]
    fn test_runtime_column_conversion() {
        assert_eq!(runtime_column(Some(95)), Some(95));
        assert_eq!(runtime_column(None), None);
        assert_eq!(runtime_column(Some(u32::MAX)), Some(i32::MAX));
    }
}
