use std::collections::BTreeMap;

use crate::models::{GenreCounts, RatingDistribution, WatchEntry, WatchlistStats};

const TOP_GENRE_LIMIT: usize = 3;

/// Summarizes one owner's entries.
///
/// Pure and order-independent in its values: the same multiset of entries
/// always yields the same numbers. Non-finite ratings count as unrated and
/// missing runtimes count as zero, so this never fails.
pub fn compute_stats(entries: &[WatchEntry]) -> WatchlistStats {
    let mut total_watch_time: u64 = 0;
    let mut rating_sum = 0.0;
    let mut rated: u64 = 0;
    let mut genre_counts = GenreCounts::new();
    let mut type_counts = BTreeMap::new();
    let mut status_counts = BTreeMap::new();
    let mut rating_distribution = RatingDistribution::default();

    for entry in entries {
        total_watch_time += u64::from(entry.runtime_minutes.unwrap_or(0));

        if let Some(rating) = entry.rating.filter(|r| r.is_finite()) {
            rating_sum += rating;
            rated += 1;
            rating_distribution.record(rating);
        }

        // Counted per occurrence, so a genre listed twice in one entry counts twice
        for genre in &entry.genres {
            genre_counts.record(genre);
        }

        *type_counts.entry(entry.media_type).or_insert(0) += 1;
        *status_counts.entry(entry.status).or_insert(0) += 1;
    }

    let average_rating = if rated == 0 {
        0.0
    } else {
        round_one_decimal(rating_sum / rated as f64)
    };

    WatchlistStats {
        total_watch_time,
        average_rating,
        top_genres: top_genres(&genre_counts, TOP_GENRE_LIMIT),
        genre_counts,
        type_counts,
        rating_distribution,
        status_counts,
    }
}

/// Highest counts first; the stable sort keeps first-seen order among ties
fn top_genres(counts: &GenreCounts, limit: usize) -> Vec<String> {
    let mut ranked: Vec<(&str, u64)> = counts.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(limit)
        .map(|(label, _)| label.to_string())
        .collect()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
