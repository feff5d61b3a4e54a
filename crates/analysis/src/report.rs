//! The combined analysis report and its log rendering.

use crate::metrics::{
    ColdStartAnalysis, PerformanceAnalysis, QualityAnalysis, SimilarityAnalysis, SocialAnalysis,
};
use crate::score::{DimensionLabels, DimensionScores};
use chrono::{DateTime, Utc};
use serde::Serialize;
use store::UserId;
use tracing::info;

/// Output of [`KnnAnalyzer::run_comprehensive_analysis`](crate::KnnAnalyzer::run_comprehensive_analysis)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub timestamp: DateTime<Utc>,
    pub target_user_id: UserId,
    pub user_similarity: Option<SimilarityAnalysis>,
    pub recommendation_quality: Option<QualityAnalysis>,
    pub performance: Option<PerformanceAnalysis>,
    pub social_network: Option<SocialAnalysis>,
    pub cold_start: Option<ColdStartAnalysis>,
    /// Weighted combination of `scores`, in [0, 1]
    pub overall_score: f64,
    pub scores: DimensionScores,
    pub labels: DimensionLabels,
}

pub fn log_similarity_analysis(analysis: &SimilarityAnalysis) {
    let target = &analysis.target;
    info!(
        username = %target.username,
        friends = target.friend_count,
        watched = target.watched_count,
        average_rating = target.average_rating,
        "Target user"
    );
    info!(
        analyzed = analysis.total_users_analyzed,
        with_similarity = analysis.users_with_similarity,
        average = analysis.average_similarity,
        friend_average = analysis.friend_average_similarity,
        non_friend_average = analysis.non_friend_average_similarity,
        "User similarity"
    );
    for (i, user) in analysis.top_similar_users.iter().take(5).enumerate() {
        info!(
            "  {}. {} ({:.3}, {} common items, friend: {})",
            i + 1,
            user.username,
            user.similarity,
            user.common_items,
            user.is_friend
        );
    }
}

pub fn log_quality_analysis(analysis: &QualityAnalysis) {
    info!(
        total = analysis.total_recommendations,
        unique = analysis.unique_recommendations,
        average_rating = analysis.average_rating,
        social = analysis.social_recommendations,
        content_based = analysis.content_based_recommendations,
        diversity = analysis.diversity_score,
        "Recommendation quality"
    );
    for (genre, count) in &analysis.genre_distribution {
        info!("  genre {}: {}", genre, count);
    }
}

pub fn log_performance_analysis(analysis: &PerformanceAnalysis) {
    info!(
        duration_ms = analysis.total_duration_ms,
        neighbors = analysis.neighbors_processed,
        recommendations = analysis.recommendations_generated,
        per_second = analysis.recommendations_per_second,
        per_neighbor_ms = analysis.average_time_per_neighbor_ms,
        score = analysis.performance_score,
        "Performance"
    );
}

pub fn log_social_analysis(analysis: &SocialAnalysis) {
    info!(
        friends = analysis.total_friends,
        with_content = analysis.friends_with_watched_content,
        average_watched = analysis.average_friend_watched_count,
        potential = analysis.friend_recommendation_potential,
        influence = analysis.social_influence_score,
        "Social network"
    );
}

pub fn log_cold_start_analysis(analysis: &ColdStartAnalysis) {
    info!(
        watched = analysis.watched_count,
        rated = analysis.rated_count,
        average_rating = analysis.average_rating,
        level = analysis.cold_start_level.as_str(),
        reliability = analysis.recommendation_reliability,
        "Cold start"
    );
    for (stars, count) in &analysis.rating_distribution {
        info!("  {} stars: {}", stars, count);
    }
}

/// Every present sub-analysis followed by the overall summary
pub fn log_report(report: &AnalysisReport) {
    info!("Analysis for {} at {}", report.target_user_id, report.timestamp);

    if let Some(analysis) = &report.user_similarity {
        log_similarity_analysis(analysis);
    }
    if let Some(analysis) = &report.recommendation_quality {
        log_quality_analysis(analysis);
    }
    if let Some(analysis) = &report.performance {
        log_performance_analysis(analysis);
    }
    if let Some(analysis) = &report.social_network {
        log_social_analysis(analysis);
    }
    if let Some(analysis) = &report.cold_start {
        log_cold_start_analysis(analysis);
    }

    let labels = &report.labels;
    info!(overall_score = report.overall_score, "Overall system score");
    info!("  User similarity strength: {}", labels.similarity);
    info!("  Recommendation quality: {}", labels.quality);
    info!("  Performance efficiency: {}", labels.performance);
    info!("  Social network strength: {}", labels.social);
    info!("  Cold start handling: {}", labels.cold_start);
}
