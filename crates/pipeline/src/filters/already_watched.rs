//! Filter to remove titles the user has already watched.
//!
//! This is typically the first filter in the pipeline, as there's no
//! point in recommending something the user has already seen.

use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, UserContext};

/// Removes candidates whose content key is in the user's watched list.
///
/// ## Algorithm
/// Uses the HashSet in UserContext.watched_keys for O(1) lookups.
pub struct AlreadyWatchedFilter;

impl Filter for AlreadyWatchedFilter {
    fn name(&self) -> &str {
        "AlreadyWatchedFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, context: &UserContext) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| !context.has_watched(&candidate.key()))
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metadata_client::ContentSummary;
    use sources::CandidateSource;
    use store::{MediaType, content_key};

    #[test]
    fn test_already_watched_filter() {
        let mut context = UserContext::new("u1");
        context.watched_keys.insert(content_key(MediaType::Movie, 100));
        context.watched_keys.insert(content_key(MediaType::Tv, 200));

        let candidates = vec![
            (100, MediaType::Movie),
            (101, MediaType::Movie),
            (200, MediaType::Tv),
            // Same id as a watched show, but a movie
            (200, MediaType::Movie),
        ]
        .into_iter()
        .map(|(id, media_type)| {
            Candidate::new(ContentSummary::new(id, media_type, "T"), CandidateSource::Trending, 1.0)
        })
        .collect();

        let filtered = AlreadyWatchedFilter.apply(candidates, &context).unwrap();

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].content.id, 101);
        assert_eq!(filtered[1].key().as_str(), "200");
    }
}
