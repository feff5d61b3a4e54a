//! Analysis Engine for the CineCircle recommender.
//!
//! This crate provides:
//! - [`KnnAnalyzer`]: similarity, quality, performance, social and
//!   cold-start analyses of one user's recommendation run
//! - The weighted score combiner and [`ScoreLabel`]s
//! - [`AnalysisReport`] with JSON export and `log_*` rendering
//! - Debug helpers for a single run (validation, diversity, timing)
//!
//! Analyses never fail: a missing user or a failing store yields `None`
//! for that analysis and it contributes 0 to the overall score.

pub mod analyzer;
pub mod debug;
pub mod metrics;
pub mod report;
pub mod score;

pub use analyzer::KnnAnalyzer;
pub use debug::{
    Diversity, RecommendationValidation, RunTiming, log_recommendation_stats, log_validation,
    recommendation_diversity, track_performance, validate_recommendations,
};
pub use metrics::{
    ColdStartAnalysis, ColdStartLevel, PerformanceAnalysis, QualityAnalysis, SimilarUser,
    SimilarityAnalysis, SocialAnalysis, TargetStats,
};
pub use report::{AnalysisReport, log_report};
pub use score::{DimensionLabels, DimensionScores, ScoreLabel, ScoreWeights};
