//! Configuration for the recommendation service.
//!
//! [`RecommenderConfig`] holds the tuning knobs of the pipeline and is what
//! the orchestrator consumes. [`Config`] is the process configuration read
//! from the environment (and an optional `.env` file) and converts into it.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Tuning parameters of the recommendation pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderConfig {
    /// Neighbors kept by the Neighbor Finder
    pub neighbor_k: usize,
    /// Prefix of the users collection scanned for neighbors; `None` scans all
    pub candidate_cap: Option<usize>,
    /// Similarity multiplier for friends
    pub friend_boost: f64,
    /// Watched items a user needs to be compared
    pub min_watched: usize,
    /// Seeds used by the similar-content fallback
    pub seed_count: usize,
    /// Minimum rating of a seed
    pub seed_min_rating: u8,
    /// Social candidates enriched per requested recommendation
    pub enrichment_factor: usize,
    /// Friends scanned for the activity feed
    pub activity_friends: usize,
    /// Recent items taken from each friend
    pub activity_items_per_friend: usize,
    /// Recommendations returned when the caller doesn't say
    pub default_limit: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            neighbor_k: 15,
            candidate_cap: Some(100),
            friend_boost: 1.5,
            min_watched: 3,
            seed_count: 3,
            seed_min_rating: 4,
            enrichment_factor: 2,
            activity_friends: 5,
            activity_items_per_friend: 3,
            default_limit: 18,
        }
    }
}

/// Process configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Store snapshot loaded at startup
    #[serde(default = "default_snapshot_path")]
    pub recs_snapshot: String,

    #[serde(default = "default_neighbor_k")]
    pub recs_neighbor_k: usize,

    /// 0 disables the cap
    #[serde(default = "default_candidate_cap")]
    pub recs_candidate_cap: usize,

    #[serde(default = "default_friend_boost")]
    pub recs_friend_boost: f64,

    #[serde(default = "default_limit")]
    pub recs_default_limit: usize,
}

fn default_tmdb_api_url() -> String {
    metadata_client::DEFAULT_TMDB_API_URL.to_string()
}

fn default_snapshot_path() -> String {
    "data/sample_snapshot.json".to_string()
}

fn default_neighbor_k() -> usize {
    15
}

fn default_candidate_cap() -> usize {
    100
}

fn default_friend_boost() -> f64 {
    1.5
}

fn default_limit() -> usize {
    18
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().context("Failed to load config")
    }

    /// Load configuration from explicit key/value pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(pairs).context("Failed to load config")
    }

    pub fn recommender(&self) -> RecommenderConfig {
        RecommenderConfig {
            neighbor_k: self.recs_neighbor_k,
            candidate_cap: (self.recs_candidate_cap > 0).then_some(self.recs_candidate_cap),
            friend_boost: self.recs_friend_boost,
            default_limit: self.recs_default_limit,
            ..Default::default()
        }
    }
}
