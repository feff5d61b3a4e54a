//! Friend activity feed.
//!
//! ## Algorithm
//! 1. Take the first `activity_friends` entries of the user's friend list
//! 2. Skip the user themselves and friends without a profile document
//! 3. From each remaining friend take their most recent watched items
//! 4. Merge everything, newest first, and keep `limit` entries

use crate::config::RecommenderConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use store::{DocumentStore, UserId, WatchedItem};
use tracing::{debug, instrument};

/// Shown when a friend's profile has no username
pub const UNKNOWN_USERNAME: &str = "Unknown User";

/// One "friend watched this" event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub friend_id: UserId,
    pub friend_username: String,
    pub content: WatchedItem,
    pub timestamp: DateTime<Utc>,
}

/// Recent watched events of a user's friends, using default feed sizes
pub async fn get_friend_activity(
    store: &dyn DocumentStore,
    uid: &str,
    limit: usize,
) -> Result<Vec<ActivityEntry>> {
    friend_activity_with(store, uid, limit, &RecommenderConfig::default()).await
}

#[instrument(skip(store, config))]
pub async fn friend_activity_with(
    store: &dyn DocumentStore,
    uid: &str,
    limit: usize,
    config: &RecommenderConfig,
) -> Result<Vec<ActivityEntry>> {
    let Some(profile) = store
        .get_user(uid)
        .await
        .with_context(|| format!("Failed to load profile for {uid}"))?
    else {
        debug!("No profile, empty activity feed");
        return Ok(Vec::new());
    };

    let friends: Vec<&UserId> = profile
        .friends
        .iter()
        .take(config.activity_friends)
        .filter(|friend| friend.as_str() != uid)
        .collect();

    let per_friend = try_join_all(
        friends
            .iter()
            .map(|friend| recent_for_friend(store, friend, config.activity_items_per_friend)),
    )
    .await?;

    let mut entries: Vec<ActivityEntry> = per_friend.into_iter().flatten().collect();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries.truncate(limit);

    debug!(friends = friends.len(), entries = entries.len(), "Built activity feed");
    Ok(entries)
}

async fn recent_for_friend(
    store: &dyn DocumentStore,
    friend_id: &str,
    count: usize,
) -> Result<Vec<ActivityEntry>> {
    let (profile, mut watched) =
        tokio::try_join!(store.get_user(friend_id), store.get_watched(friend_id))
            .with_context(|| format!("Failed to load activity for {friend_id}"))?;

    let Some(profile) = profile else {
        return Ok(Vec::new());
    };

    let friend_username = if profile.username.is_empty() {
        UNKNOWN_USERNAME.to_string()
    } else {
        profile.username
    };

    watched.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));
    watched.truncate(count);

    Ok(watched
        .into_iter()
        .map(|item| ActivityEntry {
            friend_id: friend_id.to_string(),
            friend_username: friend_username.clone(),
            timestamp: item.watched_at,
            content: item,
        })
        .collect())
}
