//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::filters::{AlreadyWatchedFilter, DedupFilter, ListExclusionFilter};
use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, UserContext};
use tracing;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(AlreadyWatchedFilter)
///     .add_filter(ListExclusionFilter)
///     .add_filter(DedupFilter);
///
/// let filtered = pipeline.apply(candidates, &context)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The pipeline every recommendation tier goes through: drop anything
    /// watched, on the watchlist or being watched, then duplicates.
    pub fn exclusion() -> Self {
        Self::new()
            .add_filter(AlreadyWatchedFilter)
            .add_filter(ListExclusionFilter)
            .add_filter(DedupFilter)
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the candidates.
    pub fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &UserContext,
    ) -> Result<Vec<Candidate>> {
        let mut current = candidates;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, context)?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metadata_client::ContentSummary;
    use sources::CandidateSource;
    use store::{MediaType, content_key};

    fn candidate(id: u64, score: f64) -> Candidate {
        Candidate::new(
            ContentSummary::new(id, MediaType::Movie, format!("Movie {id}")),
            CandidateSource::Social,
            score,
        )
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        let context = UserContext::new("u1");

        let candidates = vec![candidate(1, 0.9), candidate(2, 0.8)];

        let filtered = pipeline.apply(candidates, &context).unwrap();
        assert_eq!(filtered.len(), 2);
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_single_filter() {
        let mut context = UserContext::new("u1");
        context.watched_keys.insert(content_key(MediaType::Movie, 1));

        let pipeline = FilterPipeline::new().add_filter(AlreadyWatchedFilter);

        let filtered = pipeline
            .apply(vec![candidate(1, 0.9), candidate(2, 0.8)], &context)
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].content.id, 2);
    }

    #[test]
    fn test_exclusion_pipeline() {
        let mut context = UserContext::new("u1");
        context.watched_keys.insert(content_key(MediaType::Movie, 1));
        context.watchlist_keys.insert(content_key(MediaType::Movie, 2));
        context.watching_keys.insert(content_key(MediaType::Movie, 3));

        let pipeline = FilterPipeline::exclusion();
        assert_eq!(pipeline.len(), 3);

        let candidates = (1..=5).map(|id| candidate(id, 1.0)).chain([candidate(4, 0.5)]).collect();
        let filtered = pipeline.apply(candidates, &context).unwrap();

        let ids: Vec<u64> = filtered.iter().map(|c| c.content.id).collect();
        assert_eq!(ids, vec![4, 5]);
        // First occurrence wins
        assert_eq!(filtered[0].score, 1.0);
    }
}
