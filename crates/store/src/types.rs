//! Core domain types for the social watch-tracking data.
//!
//! This module defines the records kept in the document store:
//! - Type aliases for domain clarity (UserId, ContentId)
//! - `MediaType` and the canonical `ContentKey` encoding
//! - `WatchedItem` and `ListEntry` list records
//! - `UserProfile` with the friendship graph edges

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// Type Aliases
// =============================================================================

/// Document id of a user (opaque string assigned by the auth provider)
pub type UserId = String;

/// Provider-assigned identifier of a movie or TV show.
///
/// Only unique per media type: movie 1399 and TV show 1399 are different titles.
pub type ContentId = u64;

/// Id of the sentinel document in the users collection that holds the
/// global `username -> uid` mapping. It is not a user and must be skipped
/// by every "all users" scan.
pub const USERNAMES_DOC_ID: &str = "usernames";

/// Maximum length (in characters) of a comment on a watched item
pub const MAX_COMMENT_CHARS: usize = 500;

// =============================================================================
// Content Keys
// =============================================================================

/// Kind of content a record refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Records written before TV support carry no media type and are movies
    #[default]
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical key of one piece of content across every list.
///
/// Movies use the bare numeric id (the format used before TV support was
/// added), TV shows use a `tv_` prefix. All membership checks across
/// watchlist / watching / watched go through this type, so never build the
/// string by hand: use [`content_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentKey(String);

/// Build the canonical key for `(media_type, id)`
pub fn content_key(media_type: MediaType, id: ContentId) -> ContentKey {
    match media_type {
        MediaType::Movie => ContentKey(id.to_string()),
        MediaType::Tv => ContentKey(format!("tv_{id}")),
    }
}

impl ContentKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// List Records
// =============================================================================

/// One piece of content a user has finished
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedItem {
    pub id: ContentId,
    #[serde(default, alias = "media_type")]
    pub media_type: MediaType,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "poster", alias = "poster_path")]
    pub poster_path: Option<String>,
    /// Star rating 1-5; `None` means watched but not rated
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub watched_at: DateTime<Utc>,
}

impl WatchedItem {
    /// Create an unrated watched record
    pub fn new(
        id: ContentId,
        media_type: MediaType,
        title: impl Into<String>,
        watched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            media_type,
            title: title.into(),
            poster_path: None,
            rating: None,
            comment: None,
            watched_at,
        }
    }

    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn key(&self) -> ContentKey {
        content_key(self.media_type, self.id)
    }

    /// Rating as used in rating vectors: unrated counts as 0
    pub fn rating_value(&self) -> f64 {
        self.rating.map(f64::from).unwrap_or(0.0)
    }

    pub fn is_rated(&self) -> bool {
        self.rating.is_some_and(|r| r > 0)
    }
}

/// Lighter record kept in the watchlist and watching lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEntry {
    pub id: ContentId,
    #[serde(default, alias = "media_type")]
    pub media_type: MediaType,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "poster", alias = "poster_path")]
    pub poster_path: Option<String>,
    /// `savedAt` for the watchlist, `startedAt` for watching
    #[serde(
        with = "chrono::serde::ts_milliseconds",
        alias = "savedAt",
        alias = "startedAt"
    )]
    pub added_at: DateTime<Utc>,
}

impl ListEntry {
    pub fn new(
        id: ContentId,
        media_type: MediaType,
        title: impl Into<String>,
        added_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            media_type,
            title: title.into(),
            poster_path: None,
            added_at,
        }
    }

    pub fn key(&self) -> ContentKey {
        content_key(self.media_type, self.id)
    }
}

impl From<&WatchedItem> for ListEntry {
    fn from(item: &WatchedItem) -> Self {
        Self {
            id: item.id,
            media_type: item.media_type,
            title: item.title.clone(),
            poster_path: item.poster_path.clone(),
            added_at: item.watched_at,
        }
    }
}

/// The three per-user content lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentList {
    Watchlist,
    Watching,
    Watched,
}

impl ContentList {
    /// Collection name in the document store
    pub fn collection(&self) -> &'static str {
        match self {
            ContentList::Watchlist => "watchlists",
            ContentList::Watching => "watching",
            ContentList::Watched => "watched",
        }
    }
}

// =============================================================================
// User Profiles
// =============================================================================

/// A user profile document.
///
/// `friends` is symmetric (kept on both sides); `sent_requests` /
/// `received_requests` are pending edges mirrored on the two users until the
/// request is accepted or declined; `blocked` is one-sided.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub friends: BTreeSet<UserId>,
    #[serde(default)]
    pub sent_requests: BTreeSet<UserId>,
    #[serde(default)]
    pub received_requests: BTreeSet<UserId>,
    #[serde(default)]
    pub blocked: BTreeSet<UserId>,
}

impl UserProfile {
    pub fn new(uid: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            username: username.into(),
            ..Default::default()
        }
    }

    pub fn with_friends<I, S>(mut self, friends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<UserId>,
    {
        self.friends = friends.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_friend(&self, uid: &str) -> bool {
        self.friends.contains(uid)
    }

    pub fn has_blocked(&self, uid: &str) -> bool {
        self.blocked.contains(uid)
    }
}
