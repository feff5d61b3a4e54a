//! Moving content between a user's lists.
//!
//! A content key lives in at most one of watchlist / watching / watched.
//! Moves delete from the source lists first and then write the destination,
//! so a concurrent reader may briefly see the key in neither list, or (with a
//! remote store) in two. Readers treat that as staleness.

use crate::document_store::DocumentStore;
use crate::error::Result;
use crate::snapshot::validate_watched_item;
use crate::types::{ContentList, ListEntry, WatchedItem};
use tracing::debug;

/// Record `item` as watched, removing it from the watchlist and watching lists
pub async fn mark_watched<S: DocumentStore + ?Sized>(
    store: &S,
    uid: &str,
    item: WatchedItem,
) -> Result<()> {
    validate_watched_item(&item)?;
    let key = item.key();

    let (from_watchlist, from_watching) = tokio::try_join!(
        store.remove_from_list(uid, ContentList::Watchlist, &key),
        store.remove_from_list(uid, ContentList::Watching, &key),
    )?;
    debug!(uid, key = %key, from_watchlist, from_watching, "Marking as watched");

    store.put_watched(uid, item).await
}

/// Move `entry` to the watching list, removing it from the watchlist
pub async fn start_watching<S: DocumentStore + ?Sized>(
    store: &S,
    uid: &str,
    entry: ListEntry,
) -> Result<()> {
    let key = entry.key();
    let moved = store
        .remove_from_list(uid, ContentList::Watchlist, &key)
        .await?;
    debug!(uid, key = %key, moved, "Starting to watch");

    store.put_list_entry(uid, ContentList::Watching, entry).await
}
