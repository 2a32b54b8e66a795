use serde::{Deserialize, Serialize};

use super::MediaType;

/// A search hit from the media provider, in provider rank order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaCandidate {
    pub external_id: String,
    pub title: String,
    pub media_type: MediaType,
    pub poster_url: Option<String>,
}

/// Full metadata for one provider title, normalized across movies and series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaDetails {
    pub external_id: String,
    pub title: String,
    pub media_type: MediaType,
    pub genres: Vec<String>,
    /// Movie runtime, or a single episode's runtime for series
    pub runtime_minutes: Option<u32>,
    pub poster_url: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
}
