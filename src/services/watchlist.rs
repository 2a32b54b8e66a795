use std::sync::Arc;

use uuid::Uuid;

use crate::{
    db::WatchlistStore,
    error::{AppError, AppResult},
    models::{
        normalize_rating, CreateEntryRequest, FetchAndAddRequest, MediaType, NewWatchEntry,
        UpdateEntryRequest, WatchEntry, WatchStatus, WatchlistStats,
    },
    services::{
        providers::{resolve_title, MediaProvider},
        stats::compute_stats,
    },
};

fn entry_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("entry {} not found", id))
}

fn duplicate_entry(external_id: &str) -> AppError {
    AppError::Duplicate(format!(
        "title {} already exists in watchlist",
        external_id
    ))
}

fn required_text(value: Option<String>, field: &'static str) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AppError::MissingField(field))
}

/// Owner-scoped watchlist operations
#[derive(Clone)]
pub struct WatchlistService {
    store: Arc<dyn WatchlistStore>,
    provider: Arc<dyn MediaProvider>,
}

impl WatchlistService {
    pub fn new(store: Arc<dyn WatchlistStore>, provider: Arc<dyn MediaProvider>) -> Self {
        Self { store, provider }
    }

    pub fn provider(&self) -> &dyn MediaProvider {
        self.provider.as_ref()
    }

    pub async fn list(&self, owner: Uuid) -> AppResult<Vec<WatchEntry>> {
        self.store.list_by_owner(owner).await
    }

    /// Fails with 404 when the entry is absent or belongs to someone else
    pub async fn get(&self, owner: Uuid, id: Uuid) -> AppResult<WatchEntry> {
        self.store
            .get(owner, id)
            .await?
            .ok_or_else(|| entry_not_found(id))
    }

    /// Aggregates in insertion order, which decides genre tie-breaks
    pub async fn stats(&self, owner: Uuid) -> AppResult<WatchlistStats> {
        let mut entries = self.store.list_by_owner(owner).await?;
        entries.reverse();
        Ok(compute_stats(&entries))
    }

    async fn ensure_not_imported(
        &self,
        owner: Uuid,
        media_type: MediaType,
        external_id: &str,
        except: Option<Uuid>,
    ) -> AppResult<()> {
        match self
            .store
            .find_by_external_id(owner, media_type, external_id)
            .await?
        {
            Some(existing) if Some(existing.id) != except => Err(duplicate_entry(external_id)),
            _ => Ok(()),
        }
    }

    /// Manual creation, optionally enriched through the media provider
    pub async fn create(&self, owner: Uuid, request: CreateEntryRequest) -> AppResult<WatchEntry> {
        let title = required_text(Some(request.title), "title")?;
        let rating = request.rating.map(normalize_rating).transpose()?;

        let mut media_type = request.media_type;
        let mut genres = request.genres;
        let mut runtime_minutes = request.runtime_minutes;
        let mut external_id = request.external_id;
        let mut poster_url = request.poster_url;
        let mut release_date = request.release_date;
        let mut overview = request.overview;

        if request.enrich {
            match resolve_title(self.provider.as_ref(), &title).await? {
                Some(details) => {
                    tracing::debug!(title = %title, external_id = %details.external_id, "Enriched manual entry");
                    media_type = media_type.or(Some(details.media_type));
                    if genres.is_empty() {
                        genres = details.genres;
                    }
                    runtime_minutes = runtime_minutes.or(details.runtime_minutes);
                    external_id = external_id.or(Some(details.external_id));
                    poster_url = poster_url.or(details.poster_url);
                    release_date = release_date.or(details.release_date);
                    overview = overview.or(details.overview);
                }
                None => tracing::debug!(title = %title, "No provider match, keeping manual data"),
            }
        }

        let media_type = media_type.ok_or(AppError::MissingField("mediaType"))?;

        if let Some(external_id) = external_id.as_deref() {
            self.ensure_not_imported(owner, media_type, external_id, None)
                .await?;
        }

        let entry = self
            .store
            .insert(NewWatchEntry {
                owner,
                title,
                media_type,
                status: request.status.unwrap_or(WatchStatus::Planned),
                rating,
                runtime_minutes,
                genres,
                tags: request.tags,
                notes: request.notes,
                external_id,
                poster_url,
                release_date,
                overview,
            })
            .await?;

        tracing::info!(owner = %owner, entry_id = %entry.id, "Entry created");
        Ok(entry)
    }

    /// Imports a provider title: duplicate check first, then metadata resolution
    pub async fn fetch_and_add(
        &self,
        owner: Uuid,
        request: FetchAndAddRequest,
    ) -> AppResult<WatchEntry> {
        required_text(request.title, "title")?;
        let media_type = request
            .media_type
            .ok_or(AppError::MissingField("mediaType"))?;
        let external_id = required_text(request.external_id, "externalId")?;
        let rating = request.rating.map(normalize_rating).transpose()?;

        self.ensure_not_imported(owner, media_type, &external_id, None)
            .await?;

        let details = self
            .provider
            .fetch_details(&external_id, media_type)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("title {} not found at media provider", external_id))
            })?;

        let entry = self
            .store
            .insert(NewWatchEntry {
                owner,
                title: details.title,
                media_type,
                status: request.status.unwrap_or(WatchStatus::Planned),
                rating,
                runtime_minutes: details.runtime_minutes,
                genres: details.genres,
                tags: request.tags,
                notes: request.notes.unwrap_or_default(),
                external_id: Some(external_id),
                poster_url: details.poster_url,
                release_date: details.release_date,
                overview: details.overview,
            })
            .await?;

        tracing::info!(
            owner = %owner,
            entry_id = %entry.id,
            provider = self.provider.name(),
            "Entry imported"
        );
        Ok(entry)
    }

    /// Merges the fields present in `patch` into the stored entry
    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: UpdateEntryRequest,
    ) -> AppResult<WatchEntry> {
        let mut entry = self.get(owner, id).await?;

        if let Some(title) = patch.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(AppError::InvalidInput("title cannot be empty".to_string()));
            }
            entry.title = title.to_string();
        }
        if let Some(media_type) = patch.media_type {
            entry.media_type = media_type;
        }
        if let Some(status) = patch.status {
            entry.status = status;
        }
        if let Some(rating) = patch.rating {
            entry.rating = rating.map(normalize_rating).transpose()?;
        }
        if let Some(runtime_minutes) = patch.runtime_minutes {
            entry.runtime_minutes = runtime_minutes;
        }
        if let Some(genres) = patch.genres {
            entry.genres = genres;
        }
        if let Some(tags) = patch.tags {
            entry.tags = tags;
        }
        if let Some(notes) = patch.notes {
            entry.notes = notes;
        }
        if let Some(external_id) = patch.external_id {
            entry.external_id = external_id;
        }
        if let Some(poster_url) = patch.poster_url {
            entry.poster_url = poster_url;
        }
        if let Some(release_date) = patch.release_date {
            entry.release_date = release_date;
        }
        if let Some(overview) = patch.overview {
            entry.overview = overview;
        }

        if let Some(external_id) = entry.external_id.as_deref() {
            self.ensure_not_imported(owner, entry.media_type, external_id, Some(id))
                .await?;
        }

        let updated = self
            .store
            .update(entry)
            .await?
            .ok_or_else(|| entry_not_found(id))?;

        tracing::info!(owner = %owner, entry_id = %id, "Entry updated");
        Ok(updated)
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> AppResult<()> {
        if !self.store.delete(owner, id).await? {
            return Err(entry_not_found(id));
        }

        tracing::info!(owner = %owner, entry_id = %id, "Entry deleted");
        Ok(())
    }
}
