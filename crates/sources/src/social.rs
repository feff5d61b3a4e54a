//! Social Source - collaborative candidates from nearest neighbors
//!
//! "Users who rate like you watched these"
//!
//! ## Algorithm
//! For every neighbor with positive similarity, for every title they
//! watched that the target hasn't:
//! - `score += similarity * rating` (unrated counts as 0)
//! - `contributing_count += 1`
//! - record a [`ReasonEntry`] naming the neighbor
//!
//! Buckets keep first-seen order so equal scores sort deterministically.
//! Watchlist / watching exclusion is left to the filter pipeline.

use crate::types::{Candidate, CandidateSource, Neighbor, ReasonEntry, UserContext};
use metadata_client::ContentSummary;
use std::cmp::Ordering;
use std::collections::HashMap;
use store::{ContentKey, WatchedItem};
use tracing::{debug, instrument};

/// Turns a neighbor list into scored social candidates
#[derive(Debug, Default)]
pub struct SocialSource;

impl SocialSource {
    pub fn new() -> Self {
        Self
    }

    /// Whether tier A can produce anything from these neighbors
    pub fn has_signal(neighbors: &[Neighbor]) -> bool {
        neighbors.iter().any(|n| n.similarity > 0.0)
    }

    /// Aggregate neighbor histories into candidates, best score first
    #[instrument(skip_all, fields(uid = %user_context.uid, neighbors = neighbors.len()))]
    pub fn get_candidates(
        &self,
        user_context: &UserContext,
        neighbors: &[Neighbor],
    ) -> Vec<Candidate> {
        let mut index: HashMap<ContentKey, usize> = HashMap::new();
        let mut candidates: Vec<Candidate> = Vec::new();

        for neighbor in neighbors.iter().filter(|n| n.similarity > 0.0) {
            for item in &neighbor.user.watched {
                let key = item.key();
                if user_context.has_watched(&key) {
                    continue;
                }

                let rating = item.rating_value();
                let reason = ReasonEntry::from_neighbor(
                    neighbor.username(),
                    rating,
                    neighbor.similarity,
                    neighbor.is_friend,
                );
                let score = neighbor.similarity * rating;

                match index.get(&key) {
                    Some(&i) => {
                        let candidate = &mut candidates[i];
                        candidate.score += score;
                        candidate.contributing_count += 1;
                        candidate.reasons.push(reason);
                    }
                    None => {
                        index.insert(key, candidates.len());
                        candidates.push(
                            Candidate::new(local_summary(item), CandidateSource::Social, score)
                                .with_reason(reason),
                        );
                    }
                }
            }
        }

        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        debug!(candidates = candidates.len(), "Generated social candidates");
        candidates
    }
}

/// What we know about a title from a neighbor's watched record alone
fn local_summary(item: &WatchedItem) -> ContentSummary {
    ContentSummary {
        poster_path: item.poster_path.clone(),
        ..ContentSummary::new(item.id, item.media_type, item.title.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserSnapshot;
    use chrono::Utc;
    use store::{MediaType, UserProfile, content_key};

    fn movie(id: u64, rating: Option<u8>) -> WatchedItem {
        let item = WatchedItem::new(id, MediaType::Movie, format!("Movie {id}"), Utc::now());
        match rating {
            Some(r) => item.with_rating(r),
            None => item,
        }
    }

    fn neighbor(
        uid: &str,
        similarity: f64,
        is_friend: bool,
        watched: Vec<WatchedItem>,
    ) -> Neighbor {
        Neighbor {
            user: UserSnapshot {
                profile: UserProfile::new(uid, uid),
                watched,
            },
            similarity,
            raw_similarity: similarity,
            is_friend,
        }
    }

    fn context_with_watched(watched: Vec<WatchedItem>) -> UserContext {
        let mut context = UserContext::new("target");
        context.watched_keys = watched.iter().map(|w| w.key()).collect();
        context.watched = watched;
        context
    }

    #[test]
    fn test_scores_accumulate_across_neighbors() {
        let context = context_with_watched(vec![movie(1, Some(5))]);
        let neighbors = vec![
            neighbor("bob", 0.9, true, vec![movie(1, Some(5)), movie(42, Some(4))]),
            neighbor("eve", 0.5, false, vec![movie(42, Some(2)), movie(7, Some(5))]),
        ];

        let candidates = SocialSource::new().get_candidates(&context, &neighbors);

        let top = &candidates[0];
        assert_eq!(top.key(), content_key(MediaType::Movie, 42));
        assert!((top.score - (0.9 * 4.0 + 0.5 * 2.0)).abs() < 1e-12);
        assert_eq!(top.contributing_count, 2);
        assert_eq!(top.reasons.len(), 2);
        assert!(top.reasons[0].is_friend());
        assert!(!top.reasons[1].is_friend());

        // Already watched never shows up
        assert!(candidates.iter().all(|c| c.content.id != 1));
    }

    #[test]
    fn test_non_positive_neighbors_skipped() {
        let context = context_with_watched(vec![]);
        let neighbors = vec![neighbor("zero", 0.0, false, vec![movie(5, Some(5))])];

        assert!(!SocialSource::has_signal(&neighbors));
        assert!(SocialSource::new().get_candidates(&context, &neighbors).is_empty());
    }

    #[test]
    fn test_unrated_item_contributes_zero_score() {
        let context = context_with_watched(vec![]);
        let neighbors = vec![neighbor("bob", 1.0, false, vec![movie(5, None), movie(6, Some(3))])];

        let candidates = SocialSource::new().get_candidates(&context, &neighbors);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].content.id, 6);
        assert_eq!(candidates[1].score, 0.0);
        assert_eq!(candidates[1].contributing_count, 1);
    }

    #[test]
    fn test_local_fields_carried() {
        let mut item = movie(9, Some(4));
        item.poster_path = Some("/p.jpg".to_string());
        let context = context_with_watched(vec![]);
        let neighbors = vec![neighbor("bob", 0.7, false, vec![item])];

        let candidates = SocialSource::new().get_candidates(&context, &neighbors);
        assert_eq!(candidates[0].content.title, "Movie 9");
        assert_eq!(candidates[0].content.poster_path.as_deref(), Some("/p.jpg"));
        assert_eq!(candidates[0].source, CandidateSource::Social);
    }
}
