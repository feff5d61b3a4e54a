//! Result types of the individual analyses and the pure arithmetic behind
//! them.
//!
//! Every metric is finite: empty inputs produce zeros, never NaN.

use chrono::{DateTime, Utc};
use pipeline::Recommendation;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use store::{UserId, WatchedItem};

/// `part / whole`, or 0 when `whole` is 0
fn ratio(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole } else { 0.0 }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    ratio(sum, count as f64)
}

/// Mean star rating of rated items
pub fn average_rating(watched: &[WatchedItem]) -> f64 {
    mean(watched.iter().filter_map(|item| item.rating).map(f64::from))
}

// =============================================================================
// User Similarity
// =============================================================================

/// Upper bounds of the similarity histogram buckets; the last is open
pub const SIMILARITY_BUCKETS: [(&str, f64); 6] = [
    ("0.0-0.1", 0.1),
    ("0.1-0.2", 0.2),
    ("0.2-0.3", 0.3),
    ("0.3-0.4", 0.4),
    ("0.4-0.5", 0.5),
    ("0.5+", f64::INFINITY),
];

/// One compared user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarUser {
    pub uid: UserId,
    pub username: String,
    pub similarity: f64,
    pub common_items: usize,
    pub is_friend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetStats {
    pub username: String,
    pub friend_count: usize,
    pub watched_count: usize,
    pub average_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBucket {
    pub range: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityAnalysis {
    pub target: TargetStats,
    pub total_users_analyzed: usize,
    pub users_with_similarity: usize,
    pub average_similarity: f64,
    pub friend_average_similarity: f64,
    pub non_friend_average_similarity: f64,
    pub top_similar_users: Vec<SimilarUser>,
    pub similarity_distribution: Vec<HistogramBucket>,
}

impl SimilarityAnalysis {
    /// Summarize raw (unboosted) similarities against every compared user
    pub fn from_users(target: TargetStats, mut users: Vec<SimilarUser>, top: usize) -> Self {
        users.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut distribution: Vec<HistogramBucket> = SIMILARITY_BUCKETS
            .iter()
            .map(|(range, _)| HistogramBucket { range: *range, count: 0 })
            .collect();
        for user in &users {
            let bucket = SIMILARITY_BUCKETS
                .iter()
                .position(|(_, upper)| user.similarity < *upper)
                .unwrap_or(SIMILARITY_BUCKETS.len() - 1);
            distribution[bucket].count += 1;
        }

        let analysis = Self {
            target,
            total_users_analyzed: users.len(),
            users_with_similarity: users.iter().filter(|u| u.similarity > 0.0).count(),
            average_similarity: mean(users.iter().map(|u| u.similarity)),
            friend_average_similarity: mean(
                users.iter().filter(|u| u.is_friend).map(|u| u.similarity),
            ),
            non_friend_average_similarity: mean(
                users.iter().filter(|u| !u.is_friend).map(|u| u.similarity),
            ),
            top_similar_users: Vec::new(),
            similarity_distribution: distribution,
        };

        users.truncate(top);
        Self {
            top_similar_users: users,
            ..analysis
        }
    }
}

// =============================================================================
// Recommendation Quality
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAnalysis {
    pub total_recommendations: usize,
    pub unique_recommendations: usize,
    /// Mean provider rating; missing ratings count as 0
    pub average_rating: f64,
    pub social_recommendations: usize,
    pub content_based_recommendations: usize,
    pub genre_distribution: BTreeMap<u32, usize>,
    pub year_distribution: BTreeMap<u16, usize>,
    pub diversity_score: f64,
}

impl QualityAnalysis {
    pub fn from_recommendations(recommendations: &[Recommendation]) -> Self {
        let mut genre_distribution = BTreeMap::new();
        let mut year_distribution = BTreeMap::new();
        for rec in recommendations {
            for genre in &rec.genre_ids {
                *genre_distribution.entry(*genre).or_insert(0) += 1;
            }
            if let Some(year) = rec.release_year() {
                *year_distribution.entry(year).or_insert(0) += 1;
            }
        }

        let unique: HashSet<_> = recommendations.iter().map(|r| r.key()).collect();
        let social = recommendations.iter().filter(|r| r.is_social()).count();

        Self {
            total_recommendations: recommendations.len(),
            unique_recommendations: unique.len(),
            average_rating: mean(
                recommendations
                    .iter()
                    .map(|r| r.vote_average.unwrap_or(0.0)),
            ),
            social_recommendations: social,
            content_based_recommendations: recommendations.len() - social,
            diversity_score: diversity_score(
                genre_distribution.len(),
                year_distribution.len(),
                recommendations.len(),
            ),
            genre_distribution,
            year_distribution,
        }
    }
}

/// Mean of distinct genres and distinct years, each over `min(count, 20)`
pub fn diversity_score(distinct_genres: usize, distinct_years: usize, count: usize) -> f64 {
    let denominator = count.min(20) as f64;
    let genre = ratio(distinct_genres as f64, denominator);
    let year = ratio(distinct_years as f64, denominator);
    (genre + year) / 2.0
}

// =============================================================================
// Performance
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceAnalysis {
    pub total_duration_ms: f64,
    pub neighbors_processed: usize,
    pub recommendations_generated: usize,
    pub recommendations_per_second: f64,
    pub average_time_per_neighbor_ms: f64,
    pub performance_score: f64,
}

/// Milliseconds between two instants; negative spans count as 0
pub fn elapsed_ms(started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> f64 {
    let span = finished_at - started_at;
    let ms = span
        .num_microseconds()
        .map(|us| us as f64 / 1000.0)
        .unwrap_or_else(|| span.num_milliseconds() as f64);
    ms.max(0.0)
}

impl PerformanceAnalysis {
    pub fn new(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        neighbors: usize,
        recommendations: usize,
    ) -> Self {
        let duration = elapsed_ms(started_at, finished_at);

        let time_score = (1.0 - duration / 10_000.0).max(0.0);
        let neighbor_score = (neighbors as f64 / 50.0).min(1.0);
        let recommendation_score = (recommendations as f64 / 20.0).min(1.0);

        Self {
            total_duration_ms: duration,
            neighbors_processed: neighbors,
            recommendations_generated: recommendations,
            recommendations_per_second: ratio(recommendations as f64, duration / 1000.0),
            average_time_per_neighbor_ms: ratio(duration, neighbors as f64),
            performance_score: (time_score + neighbor_score + recommendation_score) / 3.0,
        }
    }
}

// =============================================================================
// Social Network
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialAnalysis {
    pub total_friends: usize,
    pub friends_with_watched_content: usize,
    pub average_friend_watched_count: f64,
    /// Fraction of friends with any watched content
    pub friend_recommendation_potential: f64,
    pub social_influence_score: f64,
}

impl SocialAnalysis {
    /// Build from the watched count of every friend
    pub fn from_friend_watched_counts(counts: &[usize]) -> Self {
        let total_friends = counts.len();
        let with_content: Vec<usize> = counts.iter().copied().filter(|c| *c > 0).collect();

        let potential = ratio(with_content.len() as f64, total_friends as f64);
        let friend_score = (total_friends as f64 / 20.0).min(1.0);

        Self {
            total_friends,
            friends_with_watched_content: with_content.len(),
            average_friend_watched_count: mean(with_content.iter().map(|c| *c as f64)),
            friend_recommendation_potential: potential,
            social_influence_score: (friend_score + potential) / 2.0,
        }
    }
}

// =============================================================================
// Cold Start
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColdStartLevel {
    #[serde(rename = "Very Cold")]
    VeryCold,
    Cold,
    Warm,
    Hot,
}

impl ColdStartLevel {
    pub fn from_watched_count(count: usize) -> Self {
        match count {
            0 => ColdStartLevel::VeryCold,
            1..=4 => ColdStartLevel::Cold,
            5..=14 => ColdStartLevel::Warm,
            _ => ColdStartLevel::Hot,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColdStartLevel::VeryCold => "Very Cold",
            ColdStartLevel::Cold => "Cold",
            ColdStartLevel::Warm => "Warm",
            ColdStartLevel::Hot => "Hot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColdStartAnalysis {
    pub watched_count: usize,
    pub rated_count: usize,
    pub average_rating: f64,
    /// Star rating (1-5) to count
    pub rating_distribution: BTreeMap<u8, usize>,
    pub cold_start_level: ColdStartLevel,
    pub recommendation_reliability: f64,
}

impl ColdStartAnalysis {
    pub fn from_watched(watched: &[WatchedItem]) -> Self {
        let mut rating_distribution: BTreeMap<u8, usize> = (1..=5).map(|r| (r, 0)).collect();
        for rating in watched.iter().filter_map(|item| item.rating) {
            if let Some(count) = rating_distribution.get_mut(&rating) {
                *count += 1;
            }
        }
        let rated_count = watched.iter().filter(|item| item.is_rated()).count();

        Self {
            watched_count: watched.len(),
            rated_count,
            average_rating: average_rating(watched),
            rating_distribution,
            cold_start_level: ColdStartLevel::from_watched_count(watched.len()),
            recommendation_reliability: (rated_count as f64 / 10.0).min(1.0),
        }
    }
}
