//! Filter to remove titles already on the user's watchlist or watching list.

use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, UserContext};

/// Removes candidates the user has already saved for later or started.
pub struct ListExclusionFilter;

impl Filter for ListExclusionFilter {
    fn name(&self) -> &str {
        "ListExclusionFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, context: &UserContext) -> Result<Vec<Candidate>> {
        Ok(candidates
            .into_iter()
            .filter(|candidate| {
                let key = candidate.key();
                !context.watchlist_keys.contains(&key) && !context.watching_keys.contains(&key)
            })
            .collect())
    }
}
