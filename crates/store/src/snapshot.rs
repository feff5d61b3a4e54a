//! Loading and validating store snapshots.
//!
//! A snapshot is a JSON export of the document store:
//!
//! ```json
//! {
//!   "users":      { "<uid>": { "uid": "...", "username": "...", "friends": [...] } },
//!   "usernames":  { "<username>": "<uid>" },
//!   "watched":    { "<uid>": { "<contentKey>": { "id": 550, "rating": 5, "watchedAt": 1700000000000 } } },
//!   "watchlists": { "<uid>": { "<contentKey>": { "id": 603, "savedAt": 1700000000000 } } },
//!   "watching":   { "<uid>": { "<contentKey>": { "id": 1399, "mediaType": "tv", "startedAt": 1700000000000 } } }
//! }
//! ```

use crate::error::{Result, StoreError};
use crate::memory::{Documents, MemoryStore};
use crate::types::*;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

impl Documents {
    /// Load and validate a snapshot file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!(path = %path.display(), "Loading store snapshot");
        let raw = std::fs::read_to_string(path)?;
        let docs = Self::from_json_str(&raw, &path.display().to_string())?;

        let (users, watched, saved) = docs.counts();
        info!(users, watched, saved, "Snapshot loaded and validated");
        Ok(docs)
    }

    /// Parse and validate a snapshot held in memory.
    ///
    /// `origin` is only used in error messages.
    pub fn from_json_str(raw: &str, origin: &str) -> Result<Self> {
        let docs: Documents = serde_json::from_str(raw).map_err(|source| StoreError::ParseError {
            file: origin.to_string(),
            source,
        })?;
        docs.validate()?;
        Ok(docs)
    }

    /// Validate data integrity
    ///
    /// Check that:
    /// - Profile documents are stored under their own uid
    /// - Ratings are in the valid range (1 - 5) and comments fit the limit
    /// - Every list record is stored under its canonical content key
    /// - Friend and request edges reference existing users
    /// - Friendship is symmetric and usernames are unique
    pub fn validate(&self) -> Result<()> {
        let mut seen_usernames: HashMap<&str, &str> = HashMap::new();

        for (uid, profile) in &self.users {
            if uid == USERNAMES_DOC_ID {
                return Err(StoreError::invalid("uid", uid));
            }
            if &profile.uid != uid {
                return Err(StoreError::ValidationError(format!(
                    "profile stored under {} has uid {}",
                    uid, profile.uid
                )));
            }
            if !profile.username.is_empty()
                && let Some(other) = seen_usernames.insert(&profile.username, uid)
            {
                return Err(StoreError::ValidationError(format!(
                    "username {} used by both {} and {}",
                    profile.username, other, uid
                )));
            }

            let edges = profile
                .friends
                .iter()
                .chain(&profile.sent_requests)
                .chain(&profile.received_requests);
            for other in edges {
                if !self.users.contains_key(other) {
                    return Err(StoreError::MissingReference {
                        entity: "User".to_string(),
                        id: other.clone(),
                    });
                }
            }

            for friend in &profile.friends {
                let mirrored = self
                    .users
                    .get(friend)
                    .is_some_and(|p| p.friends.contains(uid));
                if !mirrored {
                    return Err(StoreError::ValidationError(format!(
                        "friendship {} -> {} is not mirrored",
                        uid, friend
                    )));
                }
            }
        }

        for items in self.watched.values() {
            for (key, item) in items {
                check_key(key, item.key())?;
                validate_watched_item(item)?;
            }
        }

        for entries in self.watchlists.values().chain(self.watching.values()) {
            for (key, entry) in entries {
                check_key(key, entry.key())?;
            }
        }

        if let Some(index) = &self.usernames {
            validate_username_index(index, &self.users)?;
        }

        Ok(())
    }
}

impl MemoryStore {
    /// Load a snapshot file into a fresh in-memory store
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Documents::load_from_file(path).map(MemoryStore::from_documents)
    }
}

/// Rating range and comment length of one watched record
pub fn validate_watched_item(item: &WatchedItem) -> Result<()> {
    if let Some(rating) = item.rating
        && !(1..=5).contains(&rating)
    {
        return Err(StoreError::invalid("rating", rating));
    }
    if let Some(comment) = &item.comment {
        let chars = comment.chars().count();
        if chars > MAX_COMMENT_CHARS {
            return Err(StoreError::invalid("comment", format!("{chars} characters")));
        }
    }
    Ok(())
}

fn check_key(stored: &ContentKey, expected: ContentKey) -> Result<()> {
    if *stored != expected {
        return Err(StoreError::ValidationError(format!(
            "record stored under key {} should be under {}",
            stored, expected
        )));
    }
    Ok(())
}

fn validate_username_index(
    index: &BTreeMap<String, UserId>,
    users: &BTreeMap<UserId, UserProfile>,
) -> Result<()> {
    for (username, uid) in index {
        match users.get(uid) {
            Some(profile) if &profile.username == username => {}
            Some(profile) => {
                return Err(StoreError::ValidationError(format!(
                    "username index maps {} to {} whose username is {}",
                    username, uid, profile.username
                )));
            }
            None => {
                return Err(StoreError::MissingReference {
                    entity: "User".to_string(),
                    id: uid.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "users": {
            "u1": { "uid": "u1", "username": "alice", "friends": ["u2"] },
            "u2": { "uid": "u2", "username": "bob", "friends": ["u1"] }
        },
        "usernames": { "alice": "u1", "bob": "u2" },
        "watched": {
            "u1": {
                "550": { "id": 550, "title": "Fight Club", "rating": 5, "watchedAt": 1700000000000 },
                "tv_1399": { "id": 1399, "mediaType": "tv", "title": "GoT", "watchedAt": 1700000001000 }
            }
        },
        "watchlists": {
            "u1": { "603": { "id": 603, "title": "The Matrix", "savedAt": 1700000002000 } }
        }
    }"#;

    #[test]
    fn test_parse_valid_snapshot() {
        let docs = Documents::from_json_str(SNAPSHOT, "inline").unwrap();
        assert_eq!(docs.counts(), (2, 2, 1));
        assert!(docs.usernames.is_some());
    }

    #[test]
    fn test_rejects_out_of_range_rating() {
        let raw = SNAPSHOT.replace(r#""rating": 5"#, r#""rating": 6"#);
        let err = Documents::from_json_str(&raw, "inline").unwrap_err();
        assert!(matches!(err, StoreError::InvalidValue { ref field, .. } if field == "rating"));
    }

    #[test]
    fn test_rejects_wrong_tv_key() {
        // A TV record stored under a bare numeric key
        let raw = SNAPSHOT.replace(r#""tv_1399""#, r#""1399""#);
        let err = Documents::from_json_str(&raw, "inline").unwrap_err();
        assert!(matches!(err, StoreError::ValidationError(_)));
    }

    #[test]
    fn test_rejects_one_sided_friendship() {
        let raw = SNAPSHOT.replace(
            r#""username": "bob", "friends": ["u1"]"#,
            r#""username": "bob", "friends": []"#,
        );
        let err = Documents::from_json_str(&raw, "inline").unwrap_err();
        assert!(matches!(err, StoreError::ValidationError(_)));
    }

    #[test]
    fn test_rejects_duplicate_username() {
        let raw = SNAPSHOT.replace(r#""username": "bob""#, r#""username": "alice""#);
        let err = Documents::from_json_str(&raw, "inline").unwrap_err();
        assert!(matches!(err, StoreError::ValidationError(ref msg) if msg.contains("alice")));
    }

    #[test]
    fn test_empty_usernames_may_repeat() {
        let raw = SNAPSHOT
            .replace(r#""username": "alice""#, r#""username": """#)
            .replace(r#""username": "bob""#, r#""username": """#)
            .replace(r#""usernames": { "alice": "u1", "bob": "u2" },"#, "");
        assert!(Documents::from_json_str(&raw, "inline").is_ok());
    }

    #[test]
    fn test_rejects_dangling_friend() {
        let raw = SNAPSHOT.replace(r#""friends": ["u2"]"#, r#""friends": ["u2", "ghost"]"#);
        let err = Documents::from_json_str(&raw, "inline").unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { ref id, .. } if id == "ghost"));
    }

    #[test]
    fn test_rejects_long_comment() {
        let item = WatchedItem::new(1, MediaType::Movie, "Film", chrono::Utc::now())
            .with_comment("x".repeat(MAX_COMMENT_CHARS + 1));
        assert!(validate_watched_item(&item).is_err());

        let ok = item.with_comment("x".repeat(MAX_COMMENT_CHARS));
        assert!(validate_watched_item(&ok).is_ok());
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = Documents::from_json_str("{ not json", "broken.json").unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
