use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::store::{AccountStore, WatchlistStore},
    error::{AppError, AppResult},
    models::{Account, MediaType, NewWatchEntry, WatchEntry},
};

/// In-process watchlist store, used when no database is configured.
///
/// Entries are kept in insertion order.
#[derive(Clone, Default)]
pub struct MemoryWatchlistStore {
    entries: Arc<RwLock<Vec<WatchEntry>>>,
}

impl MemoryWatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn external_id_taken(
    entries: &[WatchEntry],
    owner: Uuid,
    media_type: MediaType,
    external_id: Option<&str>,
    except: Option<Uuid>,
) -> bool {
    let Some(external_id) = external_id else {
        return false;
    };

    entries.iter().any(|existing| {
        existing.owner == owner
            && Some(existing.id) != except
            && existing.media_type == media_type
            && existing.external_id.as_deref() == Some(external_id)
    })
}

#[async_trait::async_trait]
impl WatchlistStore for MemoryWatchlistStore {
    async fn list_by_owner(&self, owner: Uuid) -> AppResult<Vec<WatchEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .rev()
            .filter(|entry| entry.owner == owner)
            .cloned()
            .collect())
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> AppResult<Option<WatchEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .find(|entry| entry.id == id && entry.owner == owner)
            .cloned())
    }

    async fn find_by_external_id(
        &self,
        owner: Uuid,
        media_type: MediaType,
        external_id: &str,
    ) -> AppResult<Option<WatchEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .find(|entry| {
                entry.owner == owner
                    && entry.media_type == media_type
                    && entry.external_id.as_deref() == Some(external_id)
            })
            .cloned())
    }

    async fn insert(&self, entry: NewWatchEntry) -> AppResult<WatchEntry> {
        let mut entries = self.entries.write().await;

        if external_id_taken(
            &entries,
            entry.owner,
            entry.media_type,
            entry.external_id.as_deref(),
            None,
        ) {
            return Err(AppError::Duplicate(
                "title already exists in watchlist".to_string(),
            ));
        }

        let entry = entry.into_entry(Uuid::new_v4(), Utc::now());
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn update(&self, mut entry: WatchEntry) -> AppResult<Option<WatchEntry>> {
        let mut entries = self.entries.write().await;

        let Some(index) = entries
            .iter()
            .position(|e| e.id == entry.id && e.owner == entry.owner)
        else {
            return Ok(None);
        };

        if external_id_taken(
            &entries,
            entry.owner,
            entry.media_type,
            entry.external_id.as_deref(),
            Some(entry.id),
        ) {
            return Err(AppError::Duplicate(
                "title already exists in watchlist".to_string(),
            ));
        }

        entry.created_at = entries[index].created_at;
        entry.updated_at = Utc::now();
        entries[index] = entry.clone();
        Ok(Some(entry))
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> AppResult<bool> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|entry| !(entry.id == id && entry.owner == owner));
        Ok(entries.len() < before)
    }
}

/// In-process account store, used when no database is configured
#[derive(Clone, Default)]
pub struct MemoryAccountStore {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, account: Account) -> AppResult<Account> {
        let mut accounts = self.accounts.write().await;

        if accounts
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&account.email))
        {
            return Err(AppError::Duplicate("user already exists".to_string()));
        }

        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|account| account.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }
}
