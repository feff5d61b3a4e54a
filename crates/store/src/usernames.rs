//! The global `username -> uid` index kept in the `users/usernames` document.

use crate::document_store::DocumentStore;
use crate::error::{Result, StoreError};
use crate::types::{USERNAMES_DOC_ID, UserId};
use std::collections::BTreeMap;
use tracing::info;

/// Rebuild the index from every profile and write it to the sentinel document.
///
/// Profiles without a username are skipped. Two profiles claiming the same
/// username is a `ValidationError` and nothing is written.
pub async fn rebuild_username_index<S: DocumentStore + ?Sized>(
    store: &S,
) -> Result<BTreeMap<String, UserId>> {
    let mut index = BTreeMap::new();

    for uid in store.list_user_ids().await? {
        if uid == USERNAMES_DOC_ID {
            continue;
        }
        let Some(profile) = store.get_user(&uid).await? else {
            continue;
        };
        if profile.username.is_empty() {
            continue;
        }
        if let Some(existing) = index.insert(profile.username.clone(), uid.clone()) {
            return Err(StoreError::ValidationError(format!(
                "username {} used by both {} and {}",
                profile.username, existing, uid
            )));
        }
    }

    info!(entries = index.len(), "Rebuilt username index");
    store.put_username_index(index.clone()).await?;
    Ok(index)
}

/// Resolve a username; `Ok(None)` when unknown or the index doesn't exist yet
pub async fn lookup_uid<S: DocumentStore + ?Sized>(
    store: &S,
    username: &str,
) -> Result<Option<UserId>> {
    Ok(store
        .get_username_index()
        .await?
        .and_then(|index| index.get(username).cloned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Documents, MemoryStore};
    use crate::types::UserProfile;

    #[tokio::test]
    async fn test_rebuild_and_lookup() {
        let mut docs = Documents::new();
        docs.insert_user(UserProfile::new("u1", "alice"));
        docs.insert_user(UserProfile::new("u2", "bob"));
        docs.insert_user(UserProfile::new("u3", ""));
        let store = MemoryStore::from_documents(docs);

        assert_eq!(lookup_uid(&store, "alice").await.unwrap(), None);

        let index = rebuild_username_index(&store).await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(lookup_uid(&store, "alice").await.unwrap().as_deref(), Some("u1"));
        assert_eq!(lookup_uid(&store, "carol").await.unwrap(), None);

        // Sentinel now shows up in the id listing but is not indexed itself
        let again = rebuild_username_index(&store).await.unwrap();
        assert_eq!(again, index);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let mut docs = Documents::new();
        docs.insert_user(UserProfile::new("u1", "sam"));
        docs.insert_user(UserProfile::new("u2", "sam"));
        let store = MemoryStore::from_documents(docs);

        let result = rebuild_username_index(&store).await;
        assert!(matches!(result, Err(StoreError::ValidationError(_))));
        assert!(store.get_username_index().await.unwrap().is_none());
    }
}
