//! KNN Analyzer - diagnostics for one user's recommendation run
//!
//! ## Algorithm
//! Five independent, read-only analyses:
//! 1. User similarity: full scan of every eligible user (no scan cap)
//! 2. Recommendation quality: counts, provider rating, genre/year spread
//! 3. Performance: throughput of the run
//! 4. Social network: how much content the user's friends have
//! 5. Cold start: how much rated history the user has
//!
//! The comprehensive analysis runs them all and combines their headline
//! metrics into one score. A failed or missing analysis is `None` and scores
//! 0; nothing here returns an error.

use crate::metrics::{
    ColdStartAnalysis, PerformanceAnalysis, QualityAnalysis, SimilarUser, SimilarityAnalysis,
    SocialAnalysis, TargetStats, average_rating,
};
use crate::report::AnalysisReport;
use crate::score::{DimensionScores, ScoreWeights};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use pipeline::Recommendation;
use rayon::prelude::*;
use sources::{
    Neighbor, NeighborFinder, UserSnapshot, common_items, cosine_similarity, rating_vector,
};
use std::sync::Arc;
use store::{DocumentStore, UserProfile, WatchedItem};
use tracing::{debug, info, instrument, warn};

/// Users listed in the similarity analysis
const TOP_SIMILAR_USERS: usize = 10;

pub struct KnnAnalyzer {
    store: Arc<dyn DocumentStore>,
    neighbor_finder: NeighborFinder,
    weights: ScoreWeights,
}

impl KnnAnalyzer {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            neighbor_finder: NeighborFinder::new(store.clone()),
            store,
            weights: ScoreWeights::default(),
        }
    }

    /// Configure the combiner weights (default: 0.25/0.25/0.20/0.15/0.15)
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Run all five analyses and combine them
    #[instrument(skip(self, recommendations, neighbors))]
    pub async fn run_comprehensive_analysis(
        &self,
        uid: &str,
        recommendations: &[Recommendation],
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        neighbors: &[Neighbor],
    ) -> AnalysisReport {
        let (user_similarity, social_network, cold_start) = tokio::join!(
            self.analyze_user_similarity(uid),
            self.analyze_social_network(uid),
            self.analyze_cold_start(uid),
        );
        let recommendation_quality = self.analyze_recommendation_quality(recommendations);
        let performance = self.analyze_performance(
            started_at,
            finished_at,
            neighbors.len(),
            recommendations.len(),
        );

        let scores = DimensionScores {
            similarity: user_similarity.as_ref().map_or(0.0, |a| a.average_similarity),
            quality: recommendation_quality.diversity_score,
            performance: performance.performance_score,
            social: social_network
                .as_ref()
                .map_or(0.0, |a| a.social_influence_score),
            cold_start: cold_start
                .as_ref()
                .map_or(0.0, |a| a.recommendation_reliability),
        };
        let overall_score = scores.combine(&self.weights);
        info!(overall_score, "Comprehensive analysis complete");

        AnalysisReport {
            timestamp: Utc::now(),
            target_user_id: uid.to_string(),
            user_similarity,
            recommendation_quality: Some(recommendation_quality),
            performance: Some(performance),
            social_network,
            cold_start,
            overall_score,
            scores,
            labels: scores.labels(),
        }
    }

    /// Compare the user against every eligible user; `None` when the user
    /// has no profile or the store fails
    pub async fn analyze_user_similarity(&self, uid: &str) -> Option<SimilarityAnalysis> {
        match self.user_similarity(uid).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("User similarity analysis failed for {}: {:#}", uid, e);
                None
            }
        }
    }

    async fn user_similarity(&self, uid: &str) -> Result<Option<SimilarityAnalysis>> {
        let Some(profile) = self.store.get_user(uid).await.context("Loading profile")? else {
            debug!("Target user not found");
            return Ok(None);
        };
        let watched = self.store.get_watched(uid).await.context("Loading watched")?;
        let others = self.neighbor_finder.eligible_users(uid, None).await?;

        let target = TargetStats {
            username: profile.username.clone(),
            friend_count: profile.friends.len(),
            watched_count: watched.len(),
            average_rating: average_rating(&watched),
        };

        let users = tokio::task::spawn_blocking(move || compare_all(&profile, &watched, others))
            .await
            .context("Similarity scan task failed")?;

        Ok(Some(SimilarityAnalysis::from_users(target, users, TOP_SIMILAR_USERS)))
    }

    pub fn analyze_recommendation_quality(
        &self,
        recommendations: &[Recommendation],
    ) -> QualityAnalysis {
        QualityAnalysis::from_recommendations(recommendations)
    }

    pub fn analyze_performance(
        &self,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        neighbors: usize,
        recommendations: usize,
    ) -> PerformanceAnalysis {
        PerformanceAnalysis::new(started_at, finished_at, neighbors, recommendations)
    }

    /// Friends' watched counts; `None` when the user has no profile or the
    /// store fails
    pub async fn analyze_social_network(&self, uid: &str) -> Option<SocialAnalysis> {
        match self.social_network(uid).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Social network analysis failed for {}: {:#}", uid, e);
                None
            }
        }
    }

    async fn social_network(&self, uid: &str) -> Result<Option<SocialAnalysis>> {
        let Some(profile) = self.store.get_user(uid).await.context("Loading profile")? else {
            debug!("Target user not found");
            return Ok(None);
        };

        let counts = try_join_all(profile.friends.iter().map(|friend| async move {
            self.store
                .get_watched(friend)
                .await
                .map(|watched| watched.len())
                .with_context(|| format!("Loading watched for friend {friend}"))
        }))
        .await?;

        Ok(Some(SocialAnalysis::from_friend_watched_counts(&counts)))
    }

    /// Rated-history depth; `None` only when the store fails
    pub async fn analyze_cold_start(&self, uid: &str) -> Option<ColdStartAnalysis> {
        match self.store.get_watched(uid).await {
            Ok(watched) => Some(ColdStartAnalysis::from_watched(&watched)),
            Err(e) => {
                warn!("Cold start analysis failed for {}: {}", uid, e);
                None
            }
        }
    }

    /// Render a report as pretty-printed JSON
    pub fn export_json(report: &AnalysisReport) -> serde_json::Result<String> {
        serde_json::to_string_pretty(report)
    }
}

/// Raw cosine similarity against every user, in parallel
fn compare_all(
    profile: &UserProfile,
    watched: &[WatchedItem],
    others: Vec<UserSnapshot>,
) -> Vec<SimilarUser> {
    let target_vector = rating_vector(watched);
    others
        .into_par_iter()
        .map(|other| {
            let other_vector = rating_vector(&other.watched);
            SimilarUser {
                similarity: cosine_similarity(&target_vector, &other_vector),
                common_items: common_items(&target_vector, &other_vector),
                is_friend: profile.is_friend(other.uid()),
                username: other.profile.username,
                uid: other.profile.uid,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::collections::{BTreeMap, HashSet};
    use store::{
        ContentKey, ContentList, Documents, ListEntry, MediaType, MemoryStore, StoreError, UserId,
    };

    fn movie(id: u64, rating: u8) -> WatchedItem {
        WatchedItem::new(id, MediaType::Movie, format!("Movie {id}"), Utc::now())
            .with_rating(rating)
    }

    fn create_test_store() -> Arc<dyn DocumentStore> {
        let mut docs = Documents::new();
        docs.insert_user(UserProfile::new("tess", "tess").with_friends(["ann", "quiet"]));
        docs.insert_user(UserProfile::new("ann", "ann").with_friends(["tess"]));
        docs.insert_user(UserProfile::new("quiet", "quiet").with_friends(["tess"]));
        docs.insert_user(UserProfile::new("ben", "ben"));
        docs.insert_user(UserProfile::new("newbie", "newbie"));

        for item in [movie(1, 5), movie(2, 4), movie(3, 5)] {
            docs.insert_watched("tess", item);
        }
        for item in [movie(1, 5), movie(2, 4), movie(9, 3)] {
            docs.insert_watched("ann", item);
        }
        for item in [movie(7, 5), movie(8, 4), movie(9, 3)] {
            docs.insert_watched("ben", item);
        }
        Arc::new(MemoryStore::from_documents(docs))
    }

    /// Store whose every read fails
    struct BrokenStore;

    fn broken() -> StoreError {
        StoreError::NotFound("offline".to_string())
    }

    #[async_trait]
    impl DocumentStore for BrokenStore {
        async fn list_user_ids(&self) -> store::Result<Vec<UserId>> {
            Err(broken())
        }
        async fn get_user(&self, _uid: &str) -> store::Result<Option<UserProfile>> {
            Err(broken())
        }
        async fn put_user(&self, _profile: UserProfile) -> store::Result<()> {
            Err(broken())
        }
        async fn get_username_index(&self) -> store::Result<Option<BTreeMap<String, UserId>>> {
            Err(broken())
        }
        async fn put_username_index(&self, _index: BTreeMap<String, UserId>) -> store::Result<()> {
            Err(broken())
        }
        async fn get_watched(&self, _uid: &str) -> store::Result<Vec<WatchedItem>> {
            Err(broken())
        }
        async fn put_watched(&self, _uid: &str, _item: WatchedItem) -> store::Result<()> {
            Err(broken())
        }
        async fn get_list(&self, _uid: &str, _list: ContentList) -> store::Result<Vec<ListEntry>> {
            Err(broken())
        }
        async fn put_list_entry(
            &self,
            _uid: &str,
            _list: ContentList,
            _entry: ListEntry,
        ) -> store::Result<()> {
            Err(broken())
        }
        async fn remove_from_list(
            &self,
            _uid: &str,
            _list: ContentList,
            _key: &ContentKey,
        ) -> store::Result<bool> {
            Err(broken())
        }
        async fn list_keys(
            &self,
            _uid: &str,
            _list: ContentList,
        ) -> store::Result<HashSet<ContentKey>> {
            Err(broken())
        }
    }

    #[tokio::test]
    async fn test_user_similarity_full_scan() {
        let analyzer = KnnAnalyzer::new(create_test_store());
        let analysis = analyzer.analyze_user_similarity("tess").await.unwrap();

        // ann and ben are eligible; quiet and newbie have no history
        assert_eq!(analysis.total_users_analyzed, 2);
        assert_eq!(analysis.users_with_similarity, 1);
        assert_eq!(analysis.top_similar_users[0].uid, "ann");
        assert_eq!(analysis.top_similar_users[0].common_items, 2);
        assert!(analysis.top_similar_users[0].is_friend);
        assert!((analysis.friend_average_similarity - 1.0).abs() < 1e-9);
        assert_eq!(analysis.non_friend_average_similarity, 0.0);
        assert_eq!(analysis.target.friend_count, 2);
        assert!((analysis.target.average_rating - 14.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let analyzer = KnnAnalyzer::new(create_test_store());
        assert!(analyzer.analyze_user_similarity("ghost").await.is_none());
        assert!(analyzer.analyze_social_network("ghost").await.is_none());

        let cold = analyzer.analyze_cold_start("ghost").await.unwrap();
        assert_eq!(cold.watched_count, 0);
    }

    #[tokio::test]
    async fn test_social_network() {
        let analyzer = KnnAnalyzer::new(create_test_store());
        let analysis = analyzer.analyze_social_network("tess").await.unwrap();

        assert_eq!(analysis.total_friends, 2);
        assert_eq!(analysis.friends_with_watched_content, 1);
        assert_eq!(analysis.average_friend_watched_count, 3.0);
        assert_eq!(analysis.friend_recommendation_potential, 0.5);
    }

    #[tokio::test]
    async fn test_cold_start_user_report() {
        let analyzer = KnnAnalyzer::new(create_test_store());
        let now = Utc::now();
        let report = analyzer
            .run_comprehensive_analysis("newbie", &[], now, now + Duration::milliseconds(100), &[])
            .await;

        let cold = report.cold_start.as_ref().unwrap();
        assert_eq!(cold.cold_start_level.as_str(), "Very Cold");
        assert_eq!(cold.recommendation_reliability, 0.0);
        assert!(report.overall_score.is_finite());
        assert!((0.0..=1.0).contains(&report.overall_score));
    }

    #[tokio::test]
    async fn test_broken_store_still_reports() {
        let analyzer = KnnAnalyzer::new(Arc::new(BrokenStore));
        let now = Utc::now();
        let report = analyzer
            .run_comprehensive_analysis("tess", &[], now, now, &[])
            .await;

        assert!(report.user_similarity.is_none());
        assert!(report.social_network.is_none());
        assert!(report.cold_start.is_none());
        assert!(report.performance.is_some());
        // Only the time sub-score of performance contributes
        assert!((report.overall_score - 0.20 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_export_json() {
        let analyzer = KnnAnalyzer::new(create_test_store());
        let now = Utc::now();
        let report = analyzer
            .run_comprehensive_analysis("tess", &[], now, now, &[])
            .await;

        let json = KnnAnalyzer::export_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["targetUserId"], "tess");
        assert!(value["overallScore"].is_number());
        assert!(value["userSimilarity"]["topSimilarUsers"].is_array());
        assert_eq!(value["coldStart"]["coldStartLevel"], "Cold");
    }
}
