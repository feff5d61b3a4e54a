//! Simple test harness for the recommendation orchestrator.
//!
//! Loads a store snapshot, connects to the catalog and prints
//! recommendations and friend activity for one user.
//!
//! Usage: `server [uid]` (default `u_alice`). Configuration comes from the
//! environment, see [`server::Config`].

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use metadata_client::TmdbClient;
use server::{Config, RecommendationOrchestrator};
use store::MemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info,server=debug,sources=debug,pipeline=debug")
        .init();

    info!("Starting CineCircle server test harness");

    let config = Config::from_env()?;

    info!("Loading store snapshot from {}...", config.recs_snapshot);
    let store = Arc::new(MemoryStore::load_from_file(Path::new(&config.recs_snapshot))?);
    info!("Store snapshot loaded successfully");

    let provider =
        Arc::new(TmdbClient::new(&config.tmdb_api_key).with_api_url(&config.tmdb_api_url));
    let orchestrator =
        RecommendationOrchestrator::with_config(store, provider, config.recommender());

    let uid = std::env::args().nth(1).unwrap_or_else(|| "u_alice".to_string());
    let limit = orchestrator.config().default_limit;

    info!("Getting recommendations for user {} (limit: {})", uid, limit);
    let run = orchestrator.recommend_with_trace(&uid, limit).await?;

    info!(
        "Received {} recommendations from the {} tier in {}ms:",
        run.recommendations.len(),
        run.tier.as_str(),
        run.duration_ms()
    );
    for (i, rec) in run.recommendations.iter().enumerate() {
        info!(
            "{}. {} ({}) - Score: {:.3} [{}]",
            i + 1,
            rec.title,
            rec.release_year()
                .map(|y| y.to_string())
                .unwrap_or_else(|| "????".to_string()),
            rec.score,
            rec.source.as_str()
        );
        if let Some(reason) = &rec.reason {
            info!("   {}", reason);
        }
    }

    let activity = orchestrator.get_friend_activity(&uid, 10).await?;
    info!("Friend activity ({} entries):", activity.len());
    for entry in &activity {
        info!(
            "   {} watched {} on {}",
            entry.friend_username,
            entry.content.title,
            entry.timestamp.format("%Y-%m-%d")
        );
    }

    Ok(())
}
