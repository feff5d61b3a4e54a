//! Lightweight checks for a single recommendation run.

use crate::metrics::elapsed_ms;
use chrono::{DateTime, Utc};
use pipeline::Recommendation;
use serde::Serialize;
use sources::Neighbor;
use std::collections::HashSet;
use store::{ContentKey, WatchedItem};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationValidation {
    pub total: usize,
    /// Distinct content keys
    pub unique: usize,
    /// Recommendations the user has already watched; should be 0
    pub already_watched: usize,
    /// Recommendations with a non-zero provider rating
    pub has_ratings: usize,
    /// Social recommendations with a non-zero score
    pub has_social_score: usize,
}

pub fn validate_recommendations(
    recommendations: &[Recommendation],
    watched: &[WatchedItem],
) -> RecommendationValidation {
    let watched_keys: HashSet<ContentKey> = watched.iter().map(WatchedItem::key).collect();
    let unique: HashSet<ContentKey> = recommendations.iter().map(|r| r.key()).collect();

    RecommendationValidation {
        total: recommendations.len(),
        unique: unique.len(),
        already_watched: recommendations
            .iter()
            .filter(|r| watched_keys.contains(&r.key()))
            .count(),
        has_ratings: recommendations
            .iter()
            .filter(|r| r.vote_average.is_some_and(|v| v != 0.0))
            .count(),
        has_social_score: recommendations
            .iter()
            .filter(|r| r.is_social() && r.score != 0.0)
            .count(),
    }
}

pub fn log_validation(validation: &RecommendationValidation) {
    info!(
        total = validation.total,
        unique = validation.unique,
        already_watched = validation.already_watched,
        has_ratings = validation.has_ratings,
        has_social_score = validation.has_social_score,
        "Recommendation validation"
    );
}

/// Distinct genres and release years across a recommendation list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diversity {
    pub genre_diversity: usize,
    pub year_diversity: usize,
    pub total: usize,
}

pub fn recommendation_diversity(recommendations: &[Recommendation]) -> Diversity {
    let genres: HashSet<u32> = recommendations
        .iter()
        .flat_map(|r| r.genre_ids.iter().copied())
        .collect();
    let years: HashSet<u16> = recommendations
        .iter()
        .filter_map(Recommendation::release_year)
        .collect();

    Diversity {
        genre_diversity: genres.len(),
        year_diversity: years.len(),
        total: recommendations.len(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunTiming {
    pub duration_ms: f64,
    pub recommendations: usize,
    pub neighbors: usize,
    pub recommendations_per_second: f64,
}

pub fn track_performance(
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    recommendations: &[Recommendation],
    neighbors: &[Neighbor],
) -> RunTiming {
    let duration_ms = elapsed_ms(started_at, finished_at);
    let recommendations_per_second = if duration_ms > 0.0 {
        recommendations.len() as f64 / (duration_ms / 1000.0)
    } else {
        0.0
    };

    let timing = RunTiming {
        duration_ms,
        recommendations: recommendations.len(),
        neighbors: neighbors.len(),
        recommendations_per_second,
    };
    info!(
        duration_ms = timing.duration_ms,
        recommendations = timing.recommendations,
        neighbors = timing.neighbors,
        per_second = timing.recommendations_per_second,
        "Recommendation performance"
    );
    timing
}

/// Top five neighbors and recommendations of a run
pub fn log_recommendation_stats(
    uid: &str,
    recommendations: &[Recommendation],
    neighbors: &[Neighbor],
) {
    info!(
        uid,
        neighbors = neighbors.len(),
        recommendations = recommendations.len(),
        "Social recommendation stats"
    );

    for (i, neighbor) in neighbors.iter().take(5).enumerate() {
        info!(
            "  {}. {} (similarity: {:.3}, friend: {})",
            i + 1,
            neighbor.username(),
            neighbor.similarity,
            neighbor.is_friend
        );
    }
    for (i, rec) in recommendations.iter().take(5).enumerate() {
        info!(
            "  {}. {} (score: {:.2}, count: {})",
            i + 1,
            rec.title,
            rec.score,
            rec.contributing_count
        );
    }
}
