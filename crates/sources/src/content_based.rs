//! Similar-Content Source - fallback from the user's own favourites
//!
//! ## Algorithm
//! 1. Seeds: up to `seed_count` watched titles rated >= `seed_min_rating`,
//!    best rated first
//! 2. Fetch the provider's similar titles for every seed concurrently
//! 3. Count how many seeds proposed each title; `score = count`
//! 4. Drop titles the user already watched

use crate::types::{AlgorithmicLabel, Candidate, CandidateSource, ReasonEntry, UserContext};
use anyhow::{Context, Result};
use futures::future::join_all;
use metadata_client::MetadataProvider;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use store::ContentKey;
use tracing::{debug, instrument};

/// Content-based candidates from provider "similar titles"
pub struct SimilarContentSource {
    provider: Arc<dyn MetadataProvider>,

    /// Maximum number of seed titles
    seed_count: usize,

    /// Minimum star rating for a watched title to be a seed
    seed_min_rating: u8,
}

impl SimilarContentSource {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            provider,
            seed_count: 3,
            seed_min_rating: 4,
        }
    }

    /// Configure how many seeds are used (default: 3)
    pub fn with_seed_count(mut self, count: usize) -> Self {
        self.seed_count = count;
        self
    }

    /// Configure the minimum seed rating (default: 4)
    pub fn with_seed_min_rating(mut self, rating: u8) -> Self {
        self.seed_min_rating = rating;
        self
    }

    /// Candidates ordered by how many seeds proposed them.
    ///
    /// No qualifying seeds is an empty result; a failed provider call fails
    /// the whole source.
    #[instrument(skip_all, fields(uid = %user_context.uid))]
    pub async fn get_candidates(&self, user_context: &UserContext) -> Result<Vec<Candidate>> {
        let seeds = user_context.top_rated(self.seed_count, self.seed_min_rating);
        if seeds.is_empty() {
            debug!("No seeds rated >= {}, skipping", self.seed_min_rating);
            return Ok(Vec::new());
        }
        debug!(seeds = seeds.len(), "Fetching similar titles");

        let fetches = seeds
            .iter()
            .map(|seed| self.provider.get_similar(seed.media_type, seed.id));
        let results = join_all(fetches).await;

        let mut index: HashMap<ContentKey, usize> = HashMap::new();
        let mut candidates: Vec<Candidate> = Vec::new();

        for (seed, result) in seeds.iter().zip(results) {
            let similar =
                result.with_context(|| format!("Fetching titles similar to {}", seed.key()))?;
            for summary in similar {
                let key = summary.key();
                if user_context.has_watched(&key) {
                    continue;
                }
                match index.get(&key) {
                    Some(&i) => {
                        candidates[i].score += 1.0;
                        candidates[i].contributing_count += 1;
                    }
                    None => {
                        index.insert(key, candidates.len());
                        candidates.push(
                            Candidate::new(summary, CandidateSource::SimilarContent, 1.0)
                                .with_reason(ReasonEntry::Algorithmic {
                                    label: AlgorithmicLabel::SimilarContent,
                                }),
                        );
                    }
                }
            }
        }

        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        debug!(candidates = candidates.len(), "Generated similar-content candidates");
        Ok(candidates)
    }
}
