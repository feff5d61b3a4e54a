//! Friendship graph mutations.
//!
//! Requests are mirrored on both profiles (`sent_requests` on the sender,
//! `received_requests` on the recipient) until accepted or declined.
//! Accepting promotes the pair into each other's `friends`; blocking is
//! one-sided and severs any friendship or pending request between the two.

use crate::document_store::DocumentStore;
use crate::error::{Result, StoreError};
use crate::types::UserProfile;
use tracing::debug;

async fn load_pair<S: DocumentStore + ?Sized>(
    store: &S,
    a: &str,
    b: &str,
) -> Result<(UserProfile, UserProfile)> {
    if a == b {
        return Err(StoreError::invalid("target", b));
    }
    let first = store
        .get_user(a)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("user {a}")))?;
    let second = store
        .get_user(b)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("user {b}")))?;
    Ok((first, second))
}

async fn save_pair<S: DocumentStore + ?Sized>(
    store: &S,
    first: UserProfile,
    second: UserProfile,
) -> Result<()> {
    store.put_user(first).await?;
    store.put_user(second).await
}

/// Record a pending friend request from `from` to `to`
pub async fn send_friend_request<S: DocumentStore + ?Sized>(
    store: &S,
    from: &str,
    to: &str,
) -> Result<()> {
    let (mut sender, mut recipient) = load_pair(store, from, to).await?;

    if sender.is_friend(to) {
        return Err(StoreError::invalid("request", format!("{to} is already a friend")));
    }
    if sender.has_blocked(to) || recipient.has_blocked(from) {
        return Err(StoreError::invalid("request", format!("{from} and {to} are blocked")));
    }
    if sender.sent_requests.contains(to) {
        return Err(StoreError::invalid("request", format!("already sent to {to}")));
    }
    if sender.received_requests.contains(to) {
        // They already asked us: treat as acceptance
        return accept_friend_request(store, from, to).await;
    }

    sender.sent_requests.insert(to.to_string());
    recipient.received_requests.insert(from.to_string());
    debug!(from, to, "Friend request sent");
    save_pair(store, sender, recipient).await
}

/// `uid` accepts the pending request sent by `requester`
pub async fn accept_friend_request<S: DocumentStore + ?Sized>(
    store: &S,
    uid: &str,
    requester: &str,
) -> Result<()> {
    let (mut user, mut other) = load_pair(store, uid, requester).await?;

    if !user.received_requests.remove(requester) {
        return Err(StoreError::NotFound(format!(
            "friend request from {requester} to {uid}"
        )));
    }
    other.sent_requests.remove(uid);
    user.friends.insert(requester.to_string());
    other.friends.insert(uid.to_string());
    debug!(uid, requester, "Friend request accepted");
    save_pair(store, user, other).await
}

/// `uid` declines the pending request sent by `requester`
pub async fn decline_friend_request<S: DocumentStore + ?Sized>(
    store: &S,
    uid: &str,
    requester: &str,
) -> Result<()> {
    let (mut user, mut other) = load_pair(store, uid, requester).await?;

    if !user.received_requests.remove(requester) {
        return Err(StoreError::NotFound(format!(
            "friend request from {requester} to {uid}"
        )));
    }
    other.sent_requests.remove(uid);
    save_pair(store, user, other).await
}

/// Remove the friendship on both sides; returns whether they were friends
pub async fn remove_friend<S: DocumentStore + ?Sized>(
    store: &S,
    uid: &str,
    friend: &str,
) -> Result<bool> {
    let (mut user, mut other) = load_pair(store, uid, friend).await?;
    let was_friend = user.friends.remove(friend) | other.friends.remove(uid);
    if was_friend {
        save_pair(store, user, other).await?;
    }
    Ok(was_friend)
}

/// Block `target`, dropping any friendship and pending requests between the pair
pub async fn block_user<S: DocumentStore + ?Sized>(
    store: &S,
    uid: &str,
    target: &str,
) -> Result<()> {
    let (mut user, mut other) = load_pair(store, uid, target).await?;

    user.blocked.insert(target.to_string());
    user.friends.remove(target);
    other.friends.remove(uid);
    user.sent_requests.remove(target);
    user.received_requests.remove(target);
    other.sent_requests.remove(uid);
    other.received_requests.remove(uid);
    debug!(uid, target, "User blocked");
    save_pair(store, user, other).await
}

/// Lift a block; returns whether `target` was blocked
pub async fn unblock_user<S: DocumentStore + ?Sized>(
    store: &S,
    uid: &str,
    target: &str,
) -> Result<bool> {
    let mut user = store
        .get_user(uid)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("user {uid}")))?;
    let was_blocked = user.blocked.remove(target);
    if was_blocked {
        store.put_user(user).await?;
    }
    Ok(was_blocked)
}
