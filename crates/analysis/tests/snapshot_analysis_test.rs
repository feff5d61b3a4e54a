//! Analysis over the bundled sample snapshot.

use analysis::{ColdStartLevel, KnnAnalyzer, validate_recommendations};
use chrono::Utc;
use pipeline::{FilterPipeline, Recommendation};
use sources::{NeighborFinder, SocialSource, user_context::build_user_context};
use std::path::PathBuf;
use std::sync::Arc;
use store::{DocumentStore, MemoryStore};

fn load_store() -> Arc<dyn DocumentStore> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/sample_snapshot.json");
    Arc::new(MemoryStore::load_from_file(&path).unwrap())
}

#[tokio::test]
async fn test_social_run_analysis() {
    let store = load_store();
    let started_at = Utc::now();

    let context = build_user_context(store.as_ref(), "u_alice").await.unwrap();
    let neighbors = NeighborFinder::new(store.clone())
        .find_neighbors("u_alice", 15)
        .await
        .unwrap();
    let candidates = SocialSource::new().get_candidates(&context, &neighbors);
    let recs: Vec<Recommendation> = FilterPipeline::exclusion()
        .apply(candidates, &context)
        .unwrap()
        .into_iter()
        .map(Recommendation::from)
        .collect();
    let finished_at = Utc::now();

    let validation = validate_recommendations(&recs, &context.watched);
    assert_eq!(validation.already_watched, 0);
    assert_eq!(validation.unique, validation.total);

    let report = KnnAnalyzer::new(store)
        .run_comprehensive_analysis("u_alice", &recs, started_at, finished_at, &neighbors)
        .await;

    let similarity = report.user_similarity.as_ref().unwrap();
    assert_eq!(similarity.target.username, "alice");
    assert!(similarity.users_with_similarity >= 2);
    assert!(similarity.friend_average_similarity > 0.0);

    let social = report.social_network.as_ref().unwrap();
    assert_eq!(social.total_friends, 2);
    assert_eq!(social.friend_recommendation_potential, 1.0);

    assert_eq!(
        report.recommendation_quality.as_ref().unwrap().social_recommendations,
        recs.len()
    );
    assert!((0.0..=1.0).contains(&report.overall_score));
}

#[tokio::test]
async fn test_cold_start_user() {
    let store = load_store();
    let now = Utc::now();
    let report = KnnAnalyzer::new(store)
        .run_comprehensive_analysis("u_frank", &[], now, now, &[])
        .await;

    let cold = report.cold_start.as_ref().unwrap();
    assert_eq!(cold.cold_start_level, ColdStartLevel::VeryCold);
    assert_eq!(cold.recommendation_reliability, 0.0);

    let similarity = report.user_similarity.as_ref().unwrap();
    assert_eq!(similarity.users_with_similarity, 0);
    assert_eq!(similarity.average_similarity, 0.0);
}
