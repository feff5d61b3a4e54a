//! Trending Source - last-resort candidates from global trending lists
//!
//! Movies and TV trending this week are fetched together; every title
//! scores its provider popularity.

use crate::types::{AlgorithmicLabel, Candidate, CandidateSource, ReasonEntry, UserContext};
use anyhow::{Context, Result};
use metadata_client::{MetadataProvider, TimeWindow};
use std::cmp::Ordering;
use std::sync::Arc;
use store::MediaType;
use tracing::{debug, instrument};

pub struct TrendingSource {
    provider: Arc<dyn MetadataProvider>,
    window: TimeWindow,
}

impl TrendingSource {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self {
            provider,
            window: TimeWindow::Week,
        }
    }

    /// Trending titles the user hasn't watched, most popular first
    #[instrument(skip_all, fields(uid = %user_context.uid))]
    pub async fn get_candidates(&self, user_context: &UserContext) -> Result<Vec<Candidate>> {
        let (movies, shows) = tokio::try_join!(
            self.provider.get_trending(MediaType::Movie, self.window),
            self.provider.get_trending(MediaType::Tv, self.window),
        )
        .context("Fetching trending titles")?;

        let mut candidates: Vec<Candidate> = movies
            .into_iter()
            .chain(shows)
            .filter(|summary| !user_context.has_watched(&summary.key()))
            .map(|summary| {
                let popularity = summary.popularity.unwrap_or(0.0);
                Candidate::new(summary, CandidateSource::Trending, popularity).with_reason(
                    ReasonEntry::Algorithmic {
                        label: AlgorithmicLabel::Trending,
                    },
                )
            })
            .collect();

        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        debug!(candidates = candidates.len(), "Generated trending candidates");
        Ok(candidates)
    }
}
