//! Similarity Engine - user-user cosine similarity
//!
//! ## Algorithm
//! 1. Build a rating vector per user keyed by content key (unrated = 0)
//! 2. Restrict both vectors to the keys they have in common
//! 3. Cosine similarity over that common subset only
//!
//! Norms are taken over the common keys, not the full histories, so two
//! users who agree on what they share score 1.0 however much else they
//! have watched.
//!
//! ## Learning Goals
//! - HashMap lookups to intersect two sparse vectors
//! - Returning neutral values instead of errors for degenerate input

use std::collections::HashMap;
use store::{ContentKey, WatchedItem};

/// Sparse rating vector: content key -> rating (0.0 for unrated)
pub type RatingVector = HashMap<ContentKey, f64>;

pub fn rating_vector(watched: &[WatchedItem]) -> RatingVector {
    watched
        .iter()
        .map(|item| (item.key(), item.rating_value()))
        .collect()
}

/// Number of content keys present in both vectors
pub fn common_items(a: &RatingVector, b: &RatingVector) -> usize {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.keys().filter(|key| large.contains_key(*key)).count()
}

/// Cosine similarity restricted to common keys.
///
/// Returns 0.0 when nothing is shared or when either side's common ratings
/// are all zero.
pub fn cosine_similarity(a: &RatingVector, b: &RatingVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut dot = 0.0;
    let mut small_norm = 0.0;
    let mut large_norm = 0.0;
    let mut shared = 0usize;

    for (key, &x) in small {
        if let Some(&y) = large.get(key) {
            dot += x * y;
            small_norm += x * x;
            large_norm += y * y;
            shared += 1;
        }
    }

    if shared == 0 || small_norm == 0.0 || large_norm == 0.0 {
        return 0.0;
    }

    // Clamp rounding noise (e.g. 1.0000000000000002)
    (dot / (small_norm.sqrt() * large_norm.sqrt())).clamp(-1.0, 1.0)
}

/// Similarity of two watched histories
pub fn similarity(a: &[WatchedItem], b: &[WatchedItem]) -> f64 {
    cosine_similarity(&rating_vector(a), &rating_vector(b))
}
