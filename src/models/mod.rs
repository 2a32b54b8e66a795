use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub mod account;
pub mod media;
pub mod stats;

pub use account::{Account, AccountView, AuthResponse, LoginRequest, RegisterRequest};
pub use media::{MediaCandidate, MediaDetails};
pub use stats::{GenreCounts, RatingDistribution, WatchlistStats};

/// Kind of title tracked by an entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    #[serde(alias = "tv")]
    Series,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "series",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "series" | "tv" => Ok(MediaType::Series),
            other => Err(AppError::InvalidInput(format!("unknown media type '{}'", other))),
        }
    }
}

/// Viewing progress of an entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
    #[serde(alias = "Watched")]
    Watched,
    #[serde(alias = "Watching")]
    Watching,
    #[serde(alias = "Plan to Watch", alias = "plan_to_watch")]
    Planned,
}

impl WatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::Watched => "watched",
            WatchStatus::Watching => "watching",
            WatchStatus::Planned => "planned",
        }
    }
}

impl Display for WatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watched" => Ok(WatchStatus::Watched),
            "watching" => Ok(WatchStatus::Watching),
            "planned" => Ok(WatchStatus::Planned),
            other => Err(AppError::InvalidInput(format!("unknown status '{}'", other))),
        }
    }
}

/// One tracked movie or series belonging to a single owner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchEntry {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    pub media_type: MediaType,
    pub status: WatchStatus,
    pub rating: Option<f64>,
    /// For series this is a single episode's runtime
    pub runtime_minutes: Option<u32>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub notes: String,
    pub external_id: Option<String>,
    pub poster_url: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entry fields supplied on creation; the store assigns id and timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct NewWatchEntry {
    pub owner: Uuid,
    pub title: String,
    pub media_type: MediaType,
    pub status: WatchStatus,
    pub rating: Option<f64>,
    pub runtime_minutes: Option<u32>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub notes: String,
    pub external_id: Option<String>,
    pub poster_url: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
}

impl NewWatchEntry {
    pub fn into_entry(self, id: Uuid, now: DateTime<Utc>) -> WatchEntry {
        WatchEntry {
            id,
            owner: self.owner,
            title: self.title,
            media_type: self.media_type,
            status: self.status,
            rating: self.rating,
            runtime_minutes: self.runtime_minutes,
            genres: self.genres,
            tags: self.tags,
            notes: self.notes,
            external_id: self.external_id,
            poster_url: self.poster_url,
            release_date: self.release_date,
            overview: self.overview,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of `POST /watchlist`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub status: Option<WatchStatus>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub runtime_minutes: Option<u32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "optional_external_id")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    /// Resolve the title through the media provider before saving
    #[serde(default)]
    pub enrich: bool,
}

/// Body of `PUT /watchlist/{id}`. Absent fields are left untouched;
/// nullable fields are cleared by an explicit `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WatchStatus>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub runtime_minutes: Option<Option<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable_external_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub external_id: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub poster_url: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub release_date: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub overview: Option<Option<String>>,
}

/// Body of `POST /watchlist/fetch-and-add`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchAndAddRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default, deserialize_with = "optional_external_id")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub status: Option<WatchStatus>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, alias = "comment")]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Validates a rating and rounds it to one decimal place
pub fn normalize_rating(rating: f64) -> AppResult<f64> {
    if !rating.is_finite() || !(0.0..=10.0).contains(&rating) {
        return Err(AppError::InvalidInput(format!(
            "rating must be between 0 and 10, got {}",
            rating
        )));
    }
    Ok((rating * 10.0).round() / 10.0)
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawExternalId {
    Text(String),
    Number(u64),
}

/// Provider ids arrive either as strings or as bare numbers
fn optional_external_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawExternalId>::deserialize(deserializer)?;
    Ok(raw.and_then(|id| match id {
        RawExternalId::Text(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        RawExternalId::Number(number) => Some(number.to_string()),
    }))
}

fn nullable_external_id<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_external_id(deserializer).map(Some)
}
