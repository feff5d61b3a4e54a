//! Main recommendation orchestrator
//!
//! Coordinates the full pipeline for one user:
//! 1. Build user context (history, watchlist, watching)
//! 2. Tier A: nearest neighbors -> social candidates -> exclusion -> enrichment
//! 3. Tier B (Tier A empty): similar content from the user's favourites
//! 4. Tier C (still empty): global trending
//! 5. Rank and select the top N, attach explanations
//!
//! ## Failure handling
//! Catalog failures in Tier A enrichment or Tier B are logged and the next
//! tier runs. A catalog failure in Tier C is returned to the caller. Store
//! failures are returned from every tier.
//!
//! ## Learning Goals
//! - Tiered fallthrough with explicit tier tracking
//! - Concurrent enrichment with `futures::join_all`
//! - Error context with `anyhow`

use crate::activity::{self, ActivityEntry};
use crate::config::RecommenderConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use metadata_client::{ContentSummary, MetadataProvider};
use pipeline::{FilterPipeline, Recommendation};
use sources::{
    Candidate, CandidateSource, Neighbor, NeighborFinder, SimilarContentSource, SocialSource,
    TrendingSource, UserContext, user_context::build_user_context,
};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;
use store::DocumentStore;
use tracing::{debug, info, instrument, warn};

/// The output of one recommendation request with everything needed to
/// inspect it afterwards
#[derive(Debug, Clone)]
pub struct RecommendationRun {
    pub uid: String,
    pub recommendations: Vec<Recommendation>,
    /// Neighbors found for the user, whichever tier produced the output
    pub neighbors: Vec<Neighbor>,
    /// The tier the recommendations came from
    pub tier: CandidateSource,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RecommendationRun {
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Main orchestrator that coordinates the recommendation pipeline
pub struct RecommendationOrchestrator {
    store: Arc<dyn DocumentStore>,
    provider: Arc<dyn MetadataProvider>,
    config: RecommenderConfig,

    neighbor_finder: NeighborFinder,
    social_source: SocialSource,
    similar_source: SimilarContentSource,
    trending_source: TrendingSource,

    filter_pipeline: FilterPipeline,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator with the default configuration
    pub fn new(store: Arc<dyn DocumentStore>, provider: Arc<dyn MetadataProvider>) -> Self {
        Self::with_config(store, provider, RecommenderConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn MetadataProvider>,
        config: RecommenderConfig,
    ) -> Self {
        let neighbor_finder = NeighborFinder::new(store.clone())
            .with_candidate_cap(config.candidate_cap)
            .with_friend_boost(config.friend_boost)
            .with_min_watched(config.min_watched);
        let similar_source = SimilarContentSource::new(provider.clone())
            .with_seed_count(config.seed_count)
            .with_seed_min_rating(config.seed_min_rating);
        let trending_source = TrendingSource::new(provider.clone());

        Self {
            store,
            provider,
            config,
            neighbor_finder,
            social_source: SocialSource::new(),
            similar_source,
            trending_source,
            filter_pipeline: FilterPipeline::exclusion(),
        }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Top `limit` recommendations for `uid`
    pub async fn get_social_recommendations(
        &self,
        uid: &str,
        limit: usize,
    ) -> Result<Vec<Recommendation>> {
        Ok(self.recommend_with_trace(uid, limit).await?.recommendations)
    }

    /// Recommendations plus the neighbors, tier and timing of the run
    #[instrument(skip(self))]
    pub async fn recommend_with_trace(&self, uid: &str, limit: usize) -> Result<RecommendationRun> {
        let started_at = Utc::now();
        let timer = Instant::now();
        info!("Getting recommendations for user {} (limit: {})", uid, limit);

        // Step 1: Build user context
        let user_context = build_user_context(self.store.as_ref(), uid)
            .await
            .context("Failed to build user context")?;
        debug!(
            "User context: {} watched, {} watchlist, {} watching",
            user_context.watched.len(),
            user_context.watchlist_keys.len(),
            user_context.watching_keys.len()
        );

        // Step 2: Tier A
        let neighbors = self
            .neighbor_finder
            .find_neighbors(uid, self.config.neighbor_k)
            .await
            .context("Failed to find neighbors")?;

        let mut tier = CandidateSource::Social;
        let mut candidates = self.social_tier(&user_context, &neighbors, limit).await?;

        // Step 3: Tier B
        if candidates.is_empty() {
            tier = CandidateSource::SimilarContent;
            candidates = self.similar_content_tier(&user_context).await?;
        }

        // Step 4: Tier C
        if candidates.is_empty() {
            tier = CandidateSource::Trending;
            candidates = self.trending_tier(&user_context).await?;
        }

        // Step 5: Rank and select
        let recommendations = self.rank_and_select(candidates, limit);

        info!(
            "Generated {} recommendations for user {} from {} tier in {:?}",
            recommendations.len(),
            uid,
            tier.as_str(),
            timer.elapsed()
        );

        Ok(RecommendationRun {
            uid: uid.to_string(),
            recommendations,
            neighbors,
            tier,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Recent activity of the user's friends, sized by this orchestrator's
    /// configuration
    pub async fn get_friend_activity(&self, uid: &str, limit: usize) -> Result<Vec<ActivityEntry>> {
        activity::friend_activity_with(self.store.as_ref(), uid, limit, &self.config).await
    }

    // =========================================================================
    // Tiers
    // =========================================================================

    /// Social candidates from neighbors, filtered and enriched
    async fn social_tier(
        &self,
        user_context: &UserContext,
        neighbors: &[Neighbor],
        limit: usize,
    ) -> Result<Vec<Candidate>> {
        if !SocialSource::has_signal(neighbors) {
            debug!("No neighbor with positive similarity, skipping social tier");
            return Ok(Vec::new());
        }

        let candidates = self.social_source.get_candidates(user_context, neighbors);
        let mut filtered = self.apply_filters(candidates, user_context)?;
        sort_by_score(&mut filtered);
        filtered.truncate(limit.saturating_mul(self.config.enrichment_factor));

        Ok(self.enrich(filtered).await)
    }

    async fn similar_content_tier(&self, user_context: &UserContext) -> Result<Vec<Candidate>> {
        let candidates = match self.similar_source.get_candidates(user_context).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Similar-content tier failed, falling back to trending: {:#}", e);
                return Ok(Vec::new());
            }
        };
        self.apply_filters(candidates, user_context)
    }

    async fn trending_tier(&self, user_context: &UserContext) -> Result<Vec<Candidate>> {
        let candidates = self
            .trending_source
            .get_candidates(user_context)
            .await
            .context("Trending tier failed")?;
        self.apply_filters(candidates, user_context)
    }

    /// Apply the exclusion pipeline
    fn apply_filters(
        &self,
        candidates: Vec<Candidate>,
        user_context: &UserContext,
    ) -> Result<Vec<Candidate>> {
        self.filter_pipeline
            .apply(candidates, user_context)
            .context("Failed to apply filters")
    }

    /// Refresh social candidates with live catalog details.
    ///
    /// A failed lookup keeps the candidate with its locally stored title and
    /// poster.
    async fn enrich(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let lookups = candidates.iter().map(|candidate| {
            self.provider
                .get_by_id(candidate.content.media_type, candidate.content.id)
        });
        let results = join_all(lookups).await;

        let mut failures = 0;
        let enriched: Vec<Candidate> = candidates
            .into_iter()
            .zip(results)
            .map(|(mut candidate, result)| {
                match result {
                    Ok(live) => merge_details(&mut candidate.content, live),
                    Err(e) if e.is_not_found() => {
                        failures += 1;
                        debug!("{} is unknown to the catalog", candidate.key());
                    }
                    Err(e) => {
                        failures += 1;
                        warn!("Failed to enrich {}: {}", candidate.key(), e);
                    }
                }
                candidate
            })
            .collect();

        debug!(
            "Enriched {} candidates ({} lookups failed)",
            enriched.len(),
            failures
        );
        enriched
    }

    /// Rank candidates by score and select the top N
    fn rank_and_select(&self, mut candidates: Vec<Candidate>, limit: usize) -> Vec<Recommendation> {
        sort_by_score(&mut candidates);
        candidates.truncate(limit);
        candidates.into_iter().map(Recommendation::from).collect()
    }
}

/// Descending by score; stable, NaN compares equal
fn sort_by_score(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

/// Overlay live catalog fields onto locally stored ones
fn merge_details(local: &mut ContentSummary, live: ContentSummary) {
    if !live.title.is_empty() {
        local.title = live.title;
    }
    if live.poster_path.is_some() {
        local.poster_path = live.poster_path;
    }
    local.vote_average = live.vote_average;
    local.overview = live.overview;
    local.popularity = live.popularity;
    if !live.genre_ids.is_empty() {
        local.genre_ids = live.genre_ids;
    }
    if live.release_date.is_some() {
        local.release_date = live.release_date;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use metadata_client::{MetadataError, TimeWindow};
    use store::{ContentId, MediaType, MemoryStore};

    struct NoCatalog;

    #[async_trait]
    impl MetadataProvider for NoCatalog {
        async fn get_by_id(
            &self,
            _media_type: MediaType,
            _id: ContentId,
        ) -> metadata_client::Result<ContentSummary> {
            Err(MetadataError::Decode("offline".into()))
        }

        async fn get_similar(
            &self,
            _media_type: MediaType,
            _id: ContentId,
        ) -> metadata_client::Result<Vec<ContentSummary>> {
            Ok(Vec::new())
        }

        async fn get_trending(
            &self,
            _media_type: MediaType,
            _window: TimeWindow,
        ) -> metadata_client::Result<Vec<ContentSummary>> {
            Ok(Vec::new())
        }
    }

    fn create_orchestrator() -> RecommendationOrchestrator {
        RecommendationOrchestrator::new(Arc::new(MemoryStore::new()), Arc::new(NoCatalog))
    }

    fn candidate(id: ContentId, score: f64) -> Candidate {
        Candidate::new(
            ContentSummary::new(id, MediaType::Movie, format!("Movie {id}")),
            CandidateSource::Social,
            score,
        )
    }

    #[test]
    fn test_rank_and_select_sorts_and_truncates() {
        let orchestrator = create_orchestrator();
        let candidates = vec![candidate(1, 0.5), candidate(2, 0.9), candidate(3, 0.7)];

        let result = orchestrator.rank_and_select(candidates, 2);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, 2);
        assert_eq!(result[1].id, 3);
    }

    #[test]
    fn test_rank_and_select_keeps_order_of_ties() {
        let orchestrator = create_orchestrator();
        let candidates = vec![candidate(1, 1.0), candidate(2, 2.0), candidate(3, 1.0)];

        let ids: Vec<ContentId> = orchestrator
            .rank_and_select(candidates, 10)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_rank_and_select_handles_nan() {
        let orchestrator = create_orchestrator();
        let candidates = vec![candidate(1, 0.5), candidate(2, f64::NAN), candidate(3, 0.7)];

        let result = orchestrator.rank_and_select(candidates, 10);
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_rank_and_select_zero_limit() {
        let orchestrator = create_orchestrator();
        assert!(orchestrator.rank_and_select(vec![candidate(1, 1.0)], 0).is_empty());
    }

    #[test]
    fn test_merge_details_prefers_live_fields() {
        let mut local = ContentSummary::new(550, MediaType::Movie, "Local Title");
        local.poster_path = Some("/local.jpg".into());

        let live = ContentSummary::new(550, MediaType::Movie, "")
            .with_vote_average(8.4)
            .with_popularity(61.2)
            .with_genres(vec![18]);
        merge_details(&mut local, live);

        assert_eq!(local.title, "Local Title");
        assert_eq!(local.poster_path.as_deref(), Some("/local.jpg"));
        assert_eq!(local.vote_average, Some(8.4));
        assert_eq!(local.popularity, Some(61.2));
        assert_eq!(local.genre_ids, vec![18]);
    }

    #[tokio::test]
    async fn test_enrich_failure_keeps_candidates() {
        let orchestrator = create_orchestrator();
        let enriched = orchestrator
            .enrich(vec![candidate(1, 2.0), candidate(2, 1.0)])
            .await;

        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].content.title, "Movie 1");
    }

    #[tokio::test]
    async fn test_empty_store_falls_through_to_trending() {
        let orchestrator = create_orchestrator();
        let run = orchestrator.recommend_with_trace("nobody", 5).await.unwrap();

        assert_eq!(run.tier, CandidateSource::Trending);
        assert!(run.recommendations.is_empty());
        assert!(run.neighbors.is_empty());
        assert!(run.duration_ms() >= 0);
    }
}
