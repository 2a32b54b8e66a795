/// TMDB (The Movie Database) provider
///
/// API Flow:
/// 1. Search: /search/multi → mixed movie, tv and person hits; only movie and tv are kept
/// 2. Details: /movie/{id} or /tv/{id} → genres, runtime, poster, release date
use crate::{
    error::{AppError, AppResult},
    models::{MediaCandidate, MediaDetails, MediaType},
    services::providers::MediaProvider,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_base_url: String,
}

#[derive(Debug, Deserialize)]
struct TmdbSearchResponse {
    #[serde(default)]
    results: Vec<TmdbSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbSearchResult {
    id: u64,
    #[serde(default)]
    media_type: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    name: String,
}

/// Movie and tv detail payloads share one shape; each fills its own subset
#[derive(Debug, Deserialize)]
struct TmdbDetails {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    genres: Vec<TmdbGenre>,
    #[serde(default)]
    runtime: Option<u32>,
    #[serde(default)]
    episode_run_time: Vec<u32>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    first_air_date: Option<String>,
    #[serde(default)]
    overview: Option<String>,
}

fn tmdb_path(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Movie => "movie",
        MediaType::Series => "tv",
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String, image_base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            image_base_url: image_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn poster_url(&self, poster_path: Option<String>) -> Option<String> {
        non_empty(poster_path).map(|path| format!("{}{}", self.image_base_url, path))
    }

    fn convert_search_results(&self, response: TmdbSearchResponse) -> Vec<MediaCandidate> {
        response
            .results
            .into_iter()
            .filter_map(|result| {
                let media_type = match result.media_type.as_deref() {
                    Some("movie") => MediaType::Movie,
                    Some("tv") => MediaType::Series,
                    _ => return None,
                };
                let title = non_empty(result.title).or(non_empty(result.name))?;

                Some(MediaCandidate {
                    external_id: result.id.to_string(),
                    title,
                    media_type,
                    poster_url: self.poster_url(result.poster_path),
                })
            })
            .collect()
    }

    fn convert_details(
        &self,
        details: TmdbDetails,
        media_type: MediaType,
    ) -> AppResult<MediaDetails> {
        let title = non_empty(details.title)
            .or(non_empty(details.name))
            .ok_or_else(|| {
                AppError::UpstreamUnavailable(format!("TMDB title {} has no name", details.id))
            })?;

        // Zero means unknown in TMDB payloads
        let runtime_minutes = details
            .runtime
            .filter(|minutes| *minutes > 0)
            .or_else(|| details.episode_run_time.first().copied());

        Ok(MediaDetails {
            external_id: details.id.to_string(),
            title,
            media_type,
            genres: details.genres.into_iter().map(|g| g.name).collect(),
            runtime_minutes,
            poster_url: self.poster_url(details.poster_path),
            release_date: non_empty(details.release_date).or(non_empty(details.first_air_date)),
            overview: non_empty(details.overview),
        })
    }
}

fn upstream(error: reqwest::Error) -> AppError {
    AppError::UpstreamUnavailable(format!("TMDB request failed: {}", error))
}

#[async_trait::async_trait]
impl MediaProvider for TmdbProvider {
    async fn search(&self, query: &str) -> AppResult<Vec<MediaCandidate>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let url = format!("{}/search/multi", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", query.trim())])
            .send()
            .await
            .map_err(upstream)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamUnavailable(format!(
                "TMDB search returned status {}: {}",
                status, body
            )));
        }

        let results: TmdbSearchResponse = response.json().await.map_err(upstream)?;
        let candidates = self.convert_search_results(results);

        tracing::info!(
            query = %query,
            results = candidates.len(),
            provider = self.name(),
            "Title search completed"
        );

        Ok(candidates)
    }

    async fn fetch_details(
        &self,
        external_id: &str,
        media_type: MediaType,
    ) -> AppResult<Option<MediaDetails>> {
        if external_id.is_empty() || !external_id.chars().all(|c| c.is_ascii_digit()) {
            tracing::debug!(external_id = %external_id, "Not a TMDB id");
            return Ok(None);
        }

        let url = format!("{}/{}/{}", self.api_url, tmdb_path(media_type), external_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(upstream)?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!(external_id = %external_id, %media_type, "TMDB title not found");
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamUnavailable(format!(
                "TMDB details returned status {}: {}",
                status, body
            )));
        }

        let details: TmdbDetails = response.json().await.map_err(upstream)?;
        let details = self.convert_details(details, media_type)?;

        tracing::info!(
            external_id = %external_id,
            %media_type,
            genres = details.genres.len(),
            provider = self.name(),
            "Title details fetched"
        );

        Ok(Some(details))
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
