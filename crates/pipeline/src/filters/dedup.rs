//! Filter to keep each title at most once.
//!
//! Sources can propose the same title twice (e.g. a provider listing it
//! on two pages). The first occurrence is kept, so run this after the
//! candidates are in ranking order.

use crate::traits::Filter;
use anyhow::Result;
use sources::{Candidate, UserContext};
use std::collections::HashSet;

pub struct DedupFilter;

impl Filter for DedupFilter {
    fn name(&self) -> &str {
        "DedupFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, _context: &UserContext) -> Result<Vec<Candidate>> {
        let mut seen = HashSet::new();
        Ok(candidates
            .into_iter()
            .filter(|candidate| seen.insert(candidate.key()))
            .collect())
    }
}
