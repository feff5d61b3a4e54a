//! Neighbor Finder - K nearest users by watch-history similarity
//!
//! ## Algorithm
//! 1. Load the target profile and history (no profile -> no neighbors)
//! 2. Take the first `candidate_cap` documents of the users collection,
//!    skipping the username-index sentinel and the target
//! 3. Keep users with at least `min_watched` watched items
//! 4. Score each with the Similarity Engine, multiply by `friend_boost`
//!    for the target's friends
//! 5. Stable sort by boosted similarity, keep the top `k`
//!
//! Zero-similarity neighbors are kept; consumers decide whether to use them.
//!
//! ## Learning Goals
//! - `futures::join_all` to load many documents concurrently
//! - Rayon inside `spawn_blocking` for the CPU-bound scoring pass
//! - Builder pattern for configuration

use crate::similarity::{cosine_similarity, rating_vector};
use crate::types::{Neighbor, UserSnapshot};
use anyhow::{Context, Result};
use futures::future::join_all;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;
use store::{DocumentStore, USERNAMES_DOC_ID, UserId, WatchedItem};
use tracing::{debug, instrument};

/// Finds the users whose ratings agree most with a target user
pub struct NeighborFinder {
    store: Arc<dyn DocumentStore>,

    /// How many user documents to scan (prefix of the collection)
    candidate_cap: Option<usize>,

    /// Multiplier applied to friends' similarity
    friend_boost: f64,

    /// Minimum watched items for a user to be compared at all
    min_watched: usize,
}

impl NeighborFinder {
    /// Create a finder with the default scan cap (100), boost (1.5) and
    /// eligibility threshold (3 watched items)
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            candidate_cap: Some(100),
            friend_boost: 1.5,
            min_watched: 3,
        }
    }

    /// Configure the scan cap; `None` scans every user (default: 100)
    pub fn with_candidate_cap(mut self, cap: Option<usize>) -> Self {
        self.candidate_cap = cap;
        self
    }

    /// Configure the friend boost (default: 1.5)
    pub fn with_friend_boost(mut self, boost: f64) -> Self {
        self.friend_boost = boost;
        self
    }

    /// Configure the eligibility threshold (default: 3)
    pub fn with_min_watched(mut self, min: usize) -> Self {
        self.min_watched = min;
        self
    }

    /// Top `k` neighbors of `target_uid`, most similar first
    #[instrument(skip(self))]
    pub async fn find_neighbors(&self, target_uid: &str, k: usize) -> Result<Vec<Neighbor>> {
        let Some(target) = self
            .store
            .get_user(target_uid)
            .await
            .context("Loading target profile")?
        else {
            debug!("Target user has no profile, no neighbors");
            return Ok(Vec::new());
        };
        let target_watched = self
            .store
            .get_watched(target_uid)
            .await
            .context("Loading target watched history")?;

        let candidates = self.eligible_users(target_uid, self.candidate_cap).await?;
        debug!(
            target_watched = target_watched.len(),
            candidates = candidates.len(),
            "Scoring candidate neighbors"
        );

        let friend_boost = self.friend_boost;
        let mut neighbors = tokio::task::spawn_blocking(move || {
            score_neighbors(&target_watched, &target.friends, candidates, friend_boost)
        })
        .await
        .context("Neighbor scoring task failed")?;

        // Stable, so equal scores keep collection order
        neighbors.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        neighbors.truncate(k);

        debug!(
            neighbors = neighbors.len(),
            positive = neighbors.iter().filter(|n| n.similarity > 0.0).count(),
            "Found nearest neighbors"
        );
        Ok(neighbors)
    }

    /// Users other than `target_uid` with enough history to be compared.
    ///
    /// `cap` limits the scan to a prefix of the users collection; the
    /// sentinel and the target count toward it.
    pub async fn eligible_users(
        &self,
        target_uid: &str,
        cap: Option<usize>,
    ) -> Result<Vec<UserSnapshot>> {
        let ids = self
            .store
            .list_user_ids()
            .await
            .context("Listing users")?;
        let scan: Vec<UserId> = ids
            .into_iter()
            .take(cap.unwrap_or(usize::MAX))
            .filter(|uid| uid != USERNAMES_DOC_ID && uid != target_uid)
            .collect();

        let loads = scan.iter().map(|uid| async move {
            let profile = self.store.get_user(uid).await?;
            let watched = self.store.get_watched(uid).await?;
            Ok::<_, store::StoreError>((profile, watched))
        });

        let mut users = Vec::new();
        for (uid, loaded) in scan.iter().zip(join_all(loads).await) {
            let (profile, watched) = loaded.with_context(|| format!("Loading user {uid}"))?;
            if let Some(profile) = profile
                && watched.len() >= self.min_watched
            {
                users.push(UserSnapshot { profile, watched });
            }
        }
        Ok(users)
    }
}

/// Score every candidate against the target (parallel, order-preserving)
fn score_neighbors(
    target_watched: &[WatchedItem],
    target_friends: &std::collections::BTreeSet<UserId>,
    candidates: Vec<UserSnapshot>,
    friend_boost: f64,
) -> Vec<Neighbor> {
    let target_vector = rating_vector(target_watched);

    candidates
        .into_par_iter()
        .map(|user| {
            let raw_similarity = cosine_similarity(&target_vector, &rating_vector(&user.watched));
            let is_friend = target_friends.contains(user.uid());
            let boost = if is_friend { friend_boost } else { 1.0 };
            Neighbor {
                similarity: raw_similarity * boost,
                raw_similarity,
                is_friend,
                user,
            }
        })
        .collect()
}
