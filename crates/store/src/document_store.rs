//! The document-store contract.
//!
//! The recommendation core only ever talks to storage through this trait.
//! Documents are keyed by user id in four collections (`users`, `watched`,
//! `watchlists`, `watching`); the users collection additionally holds the
//! `usernames` sentinel document.

use crate::error::Result;
use crate::types::{ContentKey, ContentList, ListEntry, UserId, UserProfile, WatchedItem};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ids of every document in the users collection, in store order.
    ///
    /// This includes the [`USERNAMES_DOC_ID`](crate::USERNAMES_DOC_ID)
    /// sentinel when the username index exists; callers scanning for users
    /// must skip it.
    async fn list_user_ids(&self) -> Result<Vec<UserId>>;

    /// Fetch a user profile; `Ok(None)` when the document doesn't exist
    async fn get_user(&self, uid: &str) -> Result<Option<UserProfile>>;

    /// Create or replace a user profile
    async fn put_user(&self, profile: UserProfile) -> Result<()>;

    /// The global `username -> uid` mapping, if it has been built
    async fn get_username_index(&self) -> Result<Option<BTreeMap<String, UserId>>>;

    async fn put_username_index(&self, index: BTreeMap<String, UserId>) -> Result<()>;

    /// All watched items of a user; empty when the user has no watched document
    async fn get_watched(&self, uid: &str) -> Result<Vec<WatchedItem>>;

    /// Create or replace one watched record (merge write keyed by content key)
    async fn put_watched(&self, uid: &str, item: WatchedItem) -> Result<()>;

    /// Entries of one list. For [`ContentList::Watched`] the watched records
    /// are returned in their lighter list form.
    async fn get_list(&self, uid: &str, list: ContentList) -> Result<Vec<ListEntry>>;

    /// Create or replace one watchlist / watching entry.
    ///
    /// Watched records carry ratings and comments and must be written with
    /// [`DocumentStore::put_watched`]; passing `ContentList::Watched` here is
    /// an `InvalidValue` error.
    async fn put_list_entry(&self, uid: &str, list: ContentList, entry: ListEntry) -> Result<()>;

    /// Remove a content key from a list; returns whether it was present
    async fn remove_from_list(&self, uid: &str, list: ContentList, key: &ContentKey)
    -> Result<bool>;

    /// Stored content keys of one list
    async fn list_keys(&self, uid: &str, list: ContentList) -> Result<HashSet<ContentKey>> {
        Ok(self
            .get_list(uid, list)
            .await?
            .iter()
            .map(ListEntry::key)
            .collect())
    }
}
