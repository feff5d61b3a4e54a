//! End-to-end tests for the tiered recommendation flow.
//!
//! A scripted catalog stands in for TMDB; the store is in memory.

use async_trait::async_trait;
use chrono::Utc;
use metadata_client::{ContentSummary, MetadataError, MetadataProvider, TimeWindow};
use server::{RecommendationOrchestrator, RecommenderConfig};
use sources::CandidateSource;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use store::{
    ContentId, ContentList, DocumentStore, Documents, ListEntry, MediaType, MemoryStore,
    UserProfile, WatchedItem, content_key,
};

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Default)]
struct FakeProvider {
    similar: HashMap<ContentId, Vec<ContentSummary>>,
    trending: HashMap<MediaType, Vec<ContentSummary>>,
    fail_by_id: HashSet<ContentId>,
    missing_by_id: HashSet<ContentId>,
    fail_similar: bool,
    fail_trending: bool,
    by_id_calls: Mutex<Vec<ContentId>>,
}

fn server_error() -> MetadataError {
    MetadataError::Status {
        status: 503,
        body: "unavailable".to_string(),
    }
}

#[async_trait]
impl MetadataProvider for FakeProvider {
    async fn get_by_id(
        &self,
        media_type: MediaType,
        id: ContentId,
    ) -> metadata_client::Result<ContentSummary> {
        self.by_id_calls.lock().unwrap().push(id);
        if self.fail_by_id.contains(&id) {
            return Err(server_error());
        }
        if self.missing_by_id.contains(&id) {
            return Err(MetadataError::Status {
                status: 404,
                body: "not found".to_string(),
            });
        }
        Ok(ContentSummary::new(id, media_type, format!("Live {id}"))
            .with_vote_average(7.5)
            .with_popularity(40.0))
    }

    async fn get_similar(
        &self,
        _media_type: MediaType,
        id: ContentId,
    ) -> metadata_client::Result<Vec<ContentSummary>> {
        if self.fail_similar {
            return Err(server_error());
        }
        Ok(self.similar.get(&id).cloned().unwrap_or_default())
    }

    async fn get_trending(
        &self,
        media_type: MediaType,
        _window: TimeWindow,
    ) -> metadata_client::Result<Vec<ContentSummary>> {
        if self.fail_trending {
            return Err(server_error());
        }
        Ok(self.trending.get(&media_type).cloned().unwrap_or_default())
    }
}

fn movie(id: ContentId, rating: u8) -> WatchedItem {
    WatchedItem::new(id, MediaType::Movie, format!("Movie {id}"), Utc::now()).with_rating(rating)
}

fn entry(id: ContentId) -> ListEntry {
    ListEntry::new(id, MediaType::Movie, format!("Movie {id}"), Utc::now())
}

fn trending_movie(id: ContentId, popularity: f64) -> ContentSummary {
    ContentSummary::new(id, MediaType::Movie, format!("Trending {id}")).with_popularity(popularity)
}

fn create_test_store() -> Arc<dyn DocumentStore> {
    let mut docs = Documents::new();
    docs.insert_user(UserProfile::new("tess", "tess").with_friends(["ann"]));
    docs.insert_user(UserProfile::new("ann", "ann").with_friends(["tess"]));
    docs.insert_user(UserProfile::new("ben", "ben"));
    docs.insert_user(UserProfile::new("newbie", "newbie"));
    docs.insert_user(UserProfile::new("fan", "fan"));
    docs.insert_user(UserProfile::new("critic", "critic"));

    for item in [movie(1, 5), movie(2, 4), movie(3, 5)] {
        docs.insert_watched("tess", item);
    }
    for item in [movie(1, 5), movie(2, 4), movie(42, 5), movie(50, 4)] {
        docs.insert_watched("ann", item);
    }
    for item in [movie(1, 4), movie(3, 5), movie(42, 4), movie(60, 3)] {
        docs.insert_watched("ben", item);
    }
    // Nobody shares these titles
    for item in [movie(300, 5), movie(301, 5), movie(302, 4)] {
        docs.insert_watched("fan", item);
    }
    for item in [movie(200, 2), movie(201, 3), movie(202, 1)] {
        docs.insert_watched("critic", item);
    }

    docs.insert_list_entry("tess", ContentList::Watchlist, entry(42));
    docs.insert_list_entry("fan", ContentList::Watchlist, entry(401));
    docs.insert_list_entry("critic", ContentList::Watching, entry(500));

    Arc::new(MemoryStore::from_documents(docs))
}

fn create_provider() -> FakeProvider {
    let mut provider = FakeProvider::default();
    provider.similar.insert(
        300,
        vec![trending_movie(400, 1.0), trending_movie(401, 1.0)],
    );
    provider.similar.insert(301, vec![trending_movie(400, 1.0)]);
    provider.trending.insert(
        MediaType::Movie,
        vec![trending_movie(500, 90.0), trending_movie(42, 80.0)],
    );
    provider.trending.insert(
        MediaType::Tv,
        vec![ContentSummary::new(1399, MediaType::Tv, "Game of Thrones").with_popularity(95.0)],
    );
    provider
}

fn orchestrator_with(provider: FakeProvider) -> (RecommendationOrchestrator, Arc<FakeProvider>) {
    let provider = Arc::new(provider);
    let orchestrator = RecommendationOrchestrator::new(create_test_store(), provider.clone());
    (orchestrator, provider)
}

// =============================================================================
// Tier A
// =============================================================================

#[tokio::test]
async fn test_social_tier_excludes_listed_titles() {
    let (orchestrator, _) = orchestrator_with(create_provider());
    let run = orchestrator.recommend_with_trace("tess", 10).await.unwrap();

    assert_eq!(run.tier, CandidateSource::Social);
    let ids: Vec<ContentId> = run.recommendations.iter().map(|r| r.id).collect();
    // 42 has the most support but sits on the watchlist
    assert_eq!(ids, vec![50, 60]);
    assert_eq!(run.neighbors[0].uid(), "ann");

    let from_ann = &run.recommendations[0];
    assert_eq!(from_ann.title, "Live 50");
    assert_eq!(from_ann.vote_average, Some(7.5));
    assert_eq!(
        from_ann.reason.as_deref(),
        Some("Because ann (your friend) watched this")
    );
    assert!(run.recommendations.iter().all(|r| r.is_social()));
}

#[tokio::test]
async fn test_enrichment_failure_keeps_recommendation() {
    let mut provider = create_provider();
    provider.fail_by_id.insert(60);
    let (orchestrator, _) = orchestrator_with(provider);

    let recs = orchestrator.get_social_recommendations("tess", 10).await.unwrap();

    let from_ben = recs.iter().find(|r| r.id == 60).unwrap();
    assert_eq!(from_ben.title, "Movie 60");
    assert_eq!(from_ben.vote_average, None);
    assert_eq!(from_ben.reason.as_deref(), Some("Because ben watched this"));
}

#[tokio::test]
async fn test_title_unknown_to_catalog_keeps_recommendation() {
    let mut provider = create_provider();
    provider.missing_by_id.insert(60);
    let (orchestrator, _) = orchestrator_with(provider);

    let recs = orchestrator.get_social_recommendations("tess", 10).await.unwrap();

    let from_ben = recs.iter().find(|r| r.id == 60).unwrap();
    assert_eq!(from_ben.title, "Movie 60");
    assert_eq!(from_ben.vote_average, None);
    assert!(recs.iter().any(|r| r.id == 50 && r.vote_average == Some(7.5)));
}

#[tokio::test]
async fn test_enrichment_window_follows_limit() {
    let provider = Arc::new(create_provider());
    let config = RecommenderConfig {
        enrichment_factor: 1,
        ..Default::default()
    };
    let orchestrator =
        RecommendationOrchestrator::with_config(create_test_store(), provider.clone(), config);

    let recs = orchestrator.get_social_recommendations("tess", 1).await.unwrap();

    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].id, 50);
    assert_eq!(*provider.by_id_calls.lock().unwrap(), vec![50]);
}

// =============================================================================
// Tier B
// =============================================================================

#[tokio::test]
async fn test_similar_content_tier_when_no_neighbor_overlaps() {
    let (orchestrator, _) = orchestrator_with(create_provider());
    let run = orchestrator.recommend_with_trace("fan", 10).await.unwrap();

    assert_eq!(run.tier, CandidateSource::SimilarContent);
    assert!(run.neighbors.iter().all(|n| n.similarity == 0.0));

    let ids: Vec<ContentId> = run.recommendations.iter().map(|r| r.id).collect();
    // 401 is on the watchlist
    assert_eq!(ids, vec![400]);
    assert_eq!(run.recommendations[0].score, 2.0);
    assert_eq!(
        run.recommendations[0].reason.as_deref(),
        Some("Because you liked similar content")
    );
}

#[tokio::test]
async fn test_similar_content_failure_falls_through() {
    let mut provider = create_provider();
    provider.fail_similar = true;
    let (orchestrator, _) = orchestrator_with(provider);

    let run = orchestrator.recommend_with_trace("fan", 10).await.unwrap();
    assert_eq!(run.tier, CandidateSource::Trending);
    assert_eq!(run.recommendations.len(), 3);
}

// =============================================================================
// Tier C
// =============================================================================

#[tokio::test]
async fn test_cold_start_gets_trending() {
    let (orchestrator, _) = orchestrator_with(create_provider());
    let run = orchestrator.recommend_with_trace("newbie", 10).await.unwrap();

    assert_eq!(run.tier, CandidateSource::Trending);
    let ids: Vec<ContentId> = run.recommendations.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1399, 500, 42]);
    assert!(
        run.recommendations
            .iter()
            .all(|r| r.reason.as_deref() == Some("Trending this week"))
    );
}

#[tokio::test]
async fn test_low_ratings_only_fall_to_trending() {
    let (orchestrator, _) = orchestrator_with(create_provider());
    let run = orchestrator.recommend_with_trace("critic", 10).await.unwrap();

    assert_eq!(run.tier, CandidateSource::Trending);
    // 500 is being watched
    let ids: Vec<ContentId> = run.recommendations.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1399, 42]);
}

#[tokio::test]
async fn test_unknown_user_gets_trending() {
    let (orchestrator, _) = orchestrator_with(create_provider());
    let run = orchestrator.recommend_with_trace("ghost", 2).await.unwrap();

    assert_eq!(run.tier, CandidateSource::Trending);
    assert_eq!(run.recommendations.len(), 2);
    assert!(run.neighbors.is_empty());
}

#[tokio::test]
async fn test_trending_failure_is_an_error() {
    let mut provider = create_provider();
    provider.fail_trending = true;
    let (orchestrator, _) = orchestrator_with(provider);

    assert!(orchestrator.recommend_with_trace("newbie", 10).await.is_err());
    // Tier A still succeeds without the catalog's trending lists
    assert!(orchestrator.recommend_with_trace("tess", 10).await.is_ok());
}

// =============================================================================
// Invariants
// =============================================================================

#[tokio::test]
async fn test_no_tier_recommends_excluded_titles() {
    let store = create_test_store();
    let orchestrator = RecommendationOrchestrator::new(store.clone(), Arc::new(create_provider()));

    for uid in ["tess", "ann", "ben", "newbie", "fan", "critic"] {
        let recs = orchestrator.get_social_recommendations(uid, 20).await.unwrap();
        let mut excluded = store.list_keys(uid, ContentList::Watched).await.unwrap();
        excluded.extend(store.list_keys(uid, ContentList::Watchlist).await.unwrap());
        excluded.extend(store.list_keys(uid, ContentList::Watching).await.unwrap());

        let keys: HashSet<_> = recs.iter().map(|r| r.key()).collect();
        assert_eq!(keys.len(), recs.len(), "duplicates for {uid}");
        assert!(keys.is_disjoint(&excluded), "excluded title recommended to {uid}");
        assert!(
            recs.windows(2).all(|w| w[0].score >= w[1].score),
            "unsorted output for {uid}"
        );
    }
}

#[tokio::test]
async fn test_sample_snapshot() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/sample_snapshot.json");
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::load_from_file(&path).unwrap());
    let orchestrator = RecommendationOrchestrator::new(store, Arc::new(create_provider()));

    let run = orchestrator.recommend_with_trace("u_alice", 18).await.unwrap();
    assert_eq!(run.tier, CandidateSource::Social);
    assert!(!run.recommendations.is_empty());
    let keys: HashSet<_> = run.recommendations.iter().map(|r| r.key()).collect();
    assert!(!keys.contains(&content_key(MediaType::Movie, 424)));
    assert!(!keys.contains(&content_key(MediaType::Tv, 1396)));
    assert!(!keys.contains(&content_key(MediaType::Movie, 550)));

    let run = orchestrator.recommend_with_trace("u_frank", 18).await.unwrap();
    assert_eq!(run.tier, CandidateSource::Trending);

    let activity = orchestrator.get_friend_activity("u_alice", 10).await.unwrap();
    assert!(!activity.is_empty());
    assert!(
        activity
            .iter()
            .all(|e| e.friend_id == "u_bob" || e.friend_id == "u_carol")
    );
}
