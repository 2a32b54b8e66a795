use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Account, MediaType, NewWatchEntry, WatchEntry},
};

/// Persistence for watchlist entries. Every lookup is scoped by owner.
#[async_trait::async_trait]
pub trait WatchlistStore: Send + Sync {
    /// All entries of `owner`, newest first. Reversed, this is insertion order.
    async fn list_by_owner(&self, owner: Uuid) -> AppResult<Vec<WatchEntry>>;

    async fn get(&self, owner: Uuid, id: Uuid) -> AppResult<Option<WatchEntry>>;

    /// Provider ids are scoped by media type, so a movie and a series may share one
    async fn find_by_external_id(
        &self,
        owner: Uuid,
        media_type: MediaType,
        external_id: &str,
    ) -> AppResult<Option<WatchEntry>>;

    /// Persists a new entry, assigning its id and timestamps.
    ///
    /// Fails with `AppError::Duplicate` when the owner already has an entry
    /// with the same media type and external id.
    async fn insert(&self, entry: NewWatchEntry) -> AppResult<WatchEntry>;

    /// Replaces the stored record matching `entry.id` and `entry.owner`.
    ///
    /// Returns `None` when no such record exists. Concurrent writers are not
    /// coordinated; the last write wins.
    async fn update(&self, entry: WatchEntry) -> AppResult<Option<WatchEntry>>;

    /// Returns whether a record was removed
    async fn delete(&self, owner: Uuid, id: Uuid) -> AppResult<bool>;
}

/// Persistence for accounts
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `AppError::Duplicate` when the email is taken
    async fn insert(&self, account: Account) -> AppResult<Account>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    async fn get(&self, id: Uuid) -> AppResult<Option<Account>>;
}
