//! Types shared by every candidate source.

use metadata_client::ContentSummary;
use serde::Serialize;
use std::collections::HashSet;
use store::{ContentKey, UserId, UserProfile, WatchedItem};

// =============================================================================
// Candidates
// =============================================================================

/// Which strategy produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Aggregated from nearest-neighbor watch histories
    Social,
    /// Provider "similar titles" of the user's favourites
    SimilarContent,
    /// Global trending lists
    Trending,
}

impl CandidateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateSource::Social => "social",
            CandidateSource::SimilarContent => "similar_content",
            CandidateSource::Trending => "trending",
        }
    }
}

/// Synthetic reason labels for candidates not attributed to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlgorithmicLabel {
    SimilarContent,
    Trending,
}

/// Why a candidate was proposed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReasonEntry {
    /// A neighbor who is also the target's friend watched it
    Friend {
        username: String,
        rating: f64,
        similarity: f64,
    },
    /// A non-friend neighbor watched it
    SimilarUser {
        username: String,
        rating: f64,
        similarity: f64,
    },
    Algorithmic { label: AlgorithmicLabel },
}

impl ReasonEntry {
    pub fn from_neighbor(username: &str, rating: f64, similarity: f64, is_friend: bool) -> Self {
        let username = username.to_string();
        if is_friend {
            ReasonEntry::Friend {
                username,
                rating,
                similarity,
            }
        } else {
            ReasonEntry::SimilarUser {
                username,
                rating,
                similarity,
            }
        }
    }

    /// Ranking weight: `similarity * rating` for user reasons
    pub fn weight(&self) -> f64 {
        match self {
            ReasonEntry::Friend {
                rating, similarity, ..
            }
            | ReasonEntry::SimilarUser {
                rating, similarity, ..
            } => similarity * rating,
            ReasonEntry::Algorithmic { .. } => 0.0,
        }
    }

    pub fn is_friend(&self) -> bool {
        matches!(self, ReasonEntry::Friend { .. })
    }
}

/// A scored piece of content proposed by one source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: ContentSummary,
    pub score: f64,
    /// Neighbors (tier A) or seeds (tier B) that proposed it
    pub contributing_count: u32,
    pub reasons: Vec<ReasonEntry>,
    pub source: CandidateSource,
}

impl Candidate {
    pub fn new(content: ContentSummary, source: CandidateSource, score: f64) -> Self {
        Self {
            content,
            score,
            contributing_count: 1,
            reasons: Vec::new(),
            source,
        }
    }

    pub fn with_reason(mut self, reason: ReasonEntry) -> Self {
        self.reasons.push(reason);
        self
    }

    pub fn key(&self) -> ContentKey {
        self.content.key()
    }
}

// =============================================================================
// Users
// =============================================================================

/// A user profile together with their watched history
#[derive(Debug, Clone)]
pub struct UserSnapshot {
    pub profile: UserProfile,
    pub watched: Vec<WatchedItem>,
}

impl UserSnapshot {
    pub fn uid(&self) -> &str {
        &self.profile.uid
    }

    pub fn username(&self) -> &str {
        &self.profile.username
    }
}

/// One nearest neighbor of the target user
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub user: UserSnapshot,
    /// Similarity after the friend boost; this is what ranking and scoring use
    pub similarity: f64,
    /// Cosine similarity before the boost
    pub raw_similarity: f64,
    pub is_friend: bool,
}

impl Neighbor {
    pub fn uid(&self) -> &str {
        self.user.uid()
    }

    pub fn username(&self) -> &str {
        self.user.username()
    }
}

/// Everything the sources need to know about the target user
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    pub uid: UserId,
    /// `None` when the user has no profile document
    pub profile: Option<UserProfile>,
    pub watched: Vec<WatchedItem>,
    pub watched_keys: HashSet<ContentKey>,
    pub watchlist_keys: HashSet<ContentKey>,
    pub watching_keys: HashSet<ContentKey>,
}

impl UserContext {
    pub fn new(uid: impl Into<UserId>) -> Self {
        Self {
            uid: uid.into(),
            ..Default::default()
        }
    }

    pub fn has_watched(&self, key: &ContentKey) -> bool {
        self.watched_keys.contains(key)
    }

    /// Present in any of watched / watchlist / watching
    pub fn is_excluded(&self, key: &ContentKey) -> bool {
        self.watched_keys.contains(key)
            || self.watchlist_keys.contains(key)
            || self.watching_keys.contains(key)
    }

    pub fn is_friend(&self, uid: &str) -> bool {
        self.profile.as_ref().is_some_and(|p| p.is_friend(uid))
    }

    pub fn friend_count(&self) -> usize {
        self.profile.as_ref().map_or(0, |p| p.friends.len())
    }

    /// Watched items rated at least `min_rating`, best first, at most `count`
    pub fn top_rated(&self, count: usize, min_rating: u8) -> Vec<&WatchedItem> {
        let mut rated: Vec<&WatchedItem> = self
            .watched
            .iter()
            .filter(|item| item.rating.is_some_and(|r| r >= min_rating))
            .collect();
        // Stable: equal ratings keep store order
        rated.sort_by(|a, b| b.rating.cmp(&a.rating));
        rated.truncate(count);
        rated
    }
}
