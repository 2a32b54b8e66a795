//! Media metadata provider abstraction
//!
//! Providers answer free-text title searches and fetch full metadata for one
//! provider id, normalizing movies and series into the same record shape.

use crate::{
    error::{AppError, AppResult},
    models::{MediaCandidate, MediaDetails, MediaType},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for media metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MediaProvider: Send + Sync {
    /// Search titles by free text, in provider rank order
    async fn search(&self, query: &str) -> AppResult<Vec<MediaCandidate>>;

    /// Fetch full metadata for a provider id.
    ///
    /// Returns `Ok(None)` when the provider has no such title; transport
    /// failures surface as `AppError::UpstreamUnavailable`.
    async fn fetch_details(
        &self,
        external_id: &str,
        media_type: MediaType,
    ) -> AppResult<Option<MediaDetails>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Resolves a free-text title to the metadata of the provider's best match
pub async fn resolve_title(
    provider: &dyn MediaProvider,
    title: &str,
) -> AppResult<Option<MediaDetails>> {
    let candidates = provider.search(title).await?;

    let Some(best) = candidates.into_iter().next() else {
        tracing::debug!(title = %title, provider = provider.name(), "No title match");
        return Ok(None);
    };

    provider
        .fetch_details(&best.external_id, best.media_type)
        .await
}

/// Stand-in used when no provider credentials are configured
#[derive(Debug, Clone, Default)]
pub struct DisabledProvider;

#[async_trait::async_trait]
impl MediaProvider for DisabledProvider {
    async fn search(&self, _query: &str) -> AppResult<Vec<MediaCandidate>> {
        Err(AppError::UpstreamUnavailable(
            "media provider is not configured".to_string(),
        ))
    }

    async fn fetch_details(
        &self,
        _external_id: &str,
        _media_type: MediaType,
    ) -> AppResult<Option<MediaDetails>> {
        Err(AppError::UpstreamUnavailable(
            "media provider is not configured".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
