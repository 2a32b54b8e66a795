use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::{collections::BTreeMap, fmt};

use super::{MediaType, WatchStatus};

/// Summary of one owner's watchlist, returned by `GET /watchlist/stats`.
///
/// Every field is present for an empty watchlist too, so clients can
/// render a fixed chart layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistStats {
    /// Minutes, summed over entries with a known runtime
    pub total_watch_time: u64,
    /// Mean of present ratings to one decimal; 0 when nothing is rated
    pub average_rating: f64,
    pub genre_counts: GenreCounts,
    /// At most three labels, highest count first
    pub top_genres: Vec<String>,
    pub type_counts: BTreeMap<MediaType, u64>,
    pub rating_distribution: RatingDistribution,
    pub status_counts: BTreeMap<WatchStatus, u64>,
}

/// Genre label counts in first-seen order.
///
/// Serialized as a JSON object whose key order is the first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreCounts(Vec<(String, u64)>);

impl GenreCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `genre`
    pub fn record(&mut self, genre: &str) {
        match self.0.iter_mut().find(|(label, _)| label == genre) {
            Some((_, count)) => *count += 1,
            None => self.0.push((genre.to_string(), 1)),
        }
    }

    pub fn get(&self, genre: &str) -> Option<u64> {
        self.0
            .iter()
            .find(|(label, _)| label == genre)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for GenreCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GenreCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GenreCountsVisitor;

        impl<'de> Visitor<'de> for GenreCountsVisitor {
            type Value = GenreCounts;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of genre label to count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((label, count)) = access.next_entry::<String, u64>()? {
                    entries.push((label, count));
                }
                Ok(GenreCounts(entries))
            }
        }

        deserializer.deserialize_map(GenreCountsVisitor)
    }
}

/// Histogram of rated entries. Bucket upper bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RatingDistribution {
    #[serde(rename = "0–4")]
    pub low: u64,
    #[serde(rename = "5–6")]
    pub mid: u64,
    #[serde(rename = "7–8")]
    pub high: u64,
    #[serde(rename = "9–10")]
    pub top: u64,
}

impl RatingDistribution {
    /// Counts one rating into its bucket
    pub fn record(&mut self, rating: f64) {
        if rating <= 4.0 {
            self.low += 1;
        } else if rating <= 6.0 {
            self.mid += 1;
        } else if rating <= 8.0 {
            self.high += 1;
        } else {
            self.top += 1;
        }
    }

    pub fn total(&self) -> u64 {
        self.low + self.mid + self.high + self.top
    }
}
