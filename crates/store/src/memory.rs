//! In-memory document store.
//!
//! `Documents` mirrors the document-store layout one-to-one (collections of
//! per-user maps keyed by content key) and doubles as the JSON snapshot
//! format. `MemoryStore` wraps it behind an async `RwLock` and implements
//! [`DocumentStore`].

use crate::document_store::DocumentStore;
use crate::error::{Result, StoreError};
use crate::types::*;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;

/// Raw contents of every collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Documents {
    pub users: BTreeMap<UserId, UserProfile>,
    /// The `users/usernames` sentinel document
    pub usernames: Option<BTreeMap<String, UserId>>,
    pub watched: BTreeMap<UserId, BTreeMap<ContentKey, WatchedItem>>,
    pub watchlists: BTreeMap<UserId, BTreeMap<ContentKey, ListEntry>>,
    pub watching: BTreeMap<UserId, BTreeMap<ContentKey, ListEntry>>,
}

impl Documents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&mut self, profile: UserProfile) {
        self.users.insert(profile.uid.clone(), profile);
    }

    pub fn insert_watched(&mut self, uid: &str, item: WatchedItem) {
        self.watched
            .entry(uid.to_string())
            .or_default()
            .insert(item.key(), item);
    }

    pub fn insert_list_entry(&mut self, uid: &str, list: ContentList, entry: ListEntry) {
        let collection = match list {
            ContentList::Watchlist => &mut self.watchlists,
            ContentList::Watching => &mut self.watching,
            ContentList::Watched => {
                // Watched entries without a rating
                let item = WatchedItem {
                    id: entry.id,
                    media_type: entry.media_type,
                    title: entry.title,
                    poster_path: entry.poster_path,
                    rating: None,
                    comment: None,
                    watched_at: entry.added_at,
                };
                self.insert_watched(uid, item);
                return;
            }
        };
        collection
            .entry(uid.to_string())
            .or_default()
            .insert(entry.key(), entry);
    }

    /// Counts for debugging: (users, watched records, watchlist + watching entries)
    pub fn counts(&self) -> (usize, usize, usize) {
        let watched = self.watched.values().map(|m| m.len()).sum();
        let saved = self
            .watchlists
            .values()
            .chain(self.watching.values())
            .map(|m| m.len())
            .sum();
        (self.users.len(), watched, saved)
    }

    fn saved_list(
        &self,
        list: ContentList,
    ) -> Option<&BTreeMap<UserId, BTreeMap<ContentKey, ListEntry>>> {
        match list {
            ContentList::Watchlist => Some(&self.watchlists),
            ContentList::Watching => Some(&self.watching),
            ContentList::Watched => None,
        }
    }
}

/// Thread-safe in-memory [`DocumentStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<Documents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents(docs: Documents) -> Self {
        Self {
            docs: RwLock::new(docs),
        }
    }

    /// Copy of the current documents (for snapshot export)
    pub async fn snapshot(&self) -> Documents {
        self.docs.read().await.clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_user_ids(&self) -> Result<Vec<UserId>> {
        let docs = self.docs.read().await;
        let mut ids: Vec<UserId> = docs.users.keys().cloned().collect();
        if docs.usernames.is_some() && !docs.users.contains_key(USERNAMES_DOC_ID) {
            ids.push(USERNAMES_DOC_ID.to_string());
            // Document ids come back in lexical order
            ids.sort();
        }
        Ok(ids)
    }

    async fn get_user(&self, uid: &str) -> Result<Option<UserProfile>> {
        Ok(self.docs.read().await.users.get(uid).cloned())
    }

    async fn put_user(&self, profile: UserProfile) -> Result<()> {
        if profile.uid == USERNAMES_DOC_ID {
            return Err(StoreError::invalid("uid", &profile.uid));
        }
        self.docs.write().await.insert_user(profile);
        Ok(())
    }

    async fn get_username_index(&self) -> Result<Option<BTreeMap<String, UserId>>> {
        Ok(self.docs.read().await.usernames.clone())
    }

    async fn put_username_index(&self, index: BTreeMap<String, UserId>) -> Result<()> {
        self.docs.write().await.usernames = Some(index);
        Ok(())
    }

    async fn get_watched(&self, uid: &str) -> Result<Vec<WatchedItem>> {
        Ok(self
            .docs
            .read()
            .await
            .watched
            .get(uid)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn put_watched(&self, uid: &str, item: WatchedItem) -> Result<()> {
        self.docs.write().await.insert_watched(uid, item);
        Ok(())
    }

    async fn get_list(&self, uid: &str, list: ContentList) -> Result<Vec<ListEntry>> {
        let docs = self.docs.read().await;
        let entries = match docs.saved_list(list) {
            Some(collection) => collection
                .get(uid)
                .map(|entries| entries.values().cloned().collect())
                .unwrap_or_default(),
            None => docs
                .watched
                .get(uid)
                .map(|items| items.values().map(ListEntry::from).collect())
                .unwrap_or_default(),
        };
        Ok(entries)
    }

    async fn put_list_entry(&self, uid: &str, list: ContentList, entry: ListEntry) -> Result<()> {
        if list == ContentList::Watched {
            return Err(StoreError::invalid("list", list.collection()));
        }
        self.docs.write().await.insert_list_entry(uid, list, entry);
        Ok(())
    }

    async fn remove_from_list(
        &self,
        uid: &str,
        list: ContentList,
        key: &ContentKey,
    ) -> Result<bool> {
        let mut docs = self.docs.write().await;
        let removed = match list {
            ContentList::Watchlist => docs
                .watchlists
                .get_mut(uid)
                .and_then(|m| m.remove(key))
                .is_some(),
            ContentList::Watching => docs
                .watching
                .get_mut(uid)
                .and_then(|m| m.remove(key))
                .is_some(),
            ContentList::Watched => docs
                .watched
                .get_mut(uid)
                .and_then(|m| m.remove(key))
                .is_some(),
        };
        Ok(removed)
    }

    async fn list_keys(&self, uid: &str, list: ContentList) -> Result<HashSet<ContentKey>> {
        let docs = self.docs.read().await;
        let keys = match docs.saved_list(list) {
            Some(collection) => collection
                .get(uid)
                .map(|entries| entries.keys().cloned().collect())
                .unwrap_or_default(),
            None => docs
                .watched
                .get(uid)
                .map(|items| items.keys().cloned().collect())
                .unwrap_or_default(),
        };
        Ok(keys)
    }
}
