//! Helper functions to build UserContext from the document store
//!
//! This module gathers everything the sources need about the target user
//! once, up front, so candidate generation never goes back to the store for
//! membership checks.
//!
//! ## Learning Note
//! The four reads have no dependency on each other, so they are issued
//! together with `tokio::try_join!`: latency is the slowest read, not the sum.

use crate::types::UserContext;
use anyhow::{Context, Result};
use store::{ContentList, DocumentStore};
use tracing::debug;

/// Build a UserContext for `uid`.
///
/// A missing profile is not an error: the context comes back with
/// `profile: None` and whatever list documents exist, which the
/// orchestrator treats as a cold start.
pub async fn build_user_context(store: &dyn DocumentStore, uid: &str) -> Result<UserContext> {
    let (profile, watched, watchlist_keys, watching_keys) = tokio::try_join!(
        store.get_user(uid),
        store.get_watched(uid),
        store.list_keys(uid, ContentList::Watchlist),
        store.list_keys(uid, ContentList::Watching),
    )
    .with_context(|| format!("Loading user context for {uid}"))?;

    let watched_keys = watched.iter().map(|item| item.key()).collect();

    debug!(
        uid,
        has_profile = profile.is_some(),
        watched = watched.len(),
        watchlist = watchlist_keys.len(),
        watching = watching_keys.len(),
        "Built user context"
    );

    Ok(UserContext {
        uid: uid.to_string(),
        profile,
        watched,
        watched_keys,
        watchlist_keys,
        watching_keys,
    })
}
