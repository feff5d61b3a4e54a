//! # Store Crate
//!
//! Domain records and document-store access for the social watch tracker.
//!
//! ## Components
//!
//! - [`types`]: `WatchedItem`, `ListEntry`, `UserProfile` and the canonical
//!   [`content_key`] encoding shared by every list
//! - [`DocumentStore`]: the async contract the recommendation core reads through
//! - [`MemoryStore`]: an in-memory implementation, loadable from a JSON snapshot
//! - [`social`], [`usernames`], [`lists`]: mutations that keep the
//!   cross-document invariants (symmetric friendships, unique usernames,
//!   one list per content key)
//!
//! ## Example Usage
//!
//! ```ignore
//! use store::{DocumentStore, MemoryStore};
//! use std::path::Path;
//!
//! let store = MemoryStore::load_from_file(Path::new("data/snapshot.json"))?;
//! let watched = store.get_watched("u1").await?;
//! ```
//!
//! ## Learning Goals
//!
//! 1. **Async traits**: `#[async_trait]` for an object-safe storage seam
//! 2. **Newtypes**: `ContentKey` makes the key encoding impossible to bypass
//! 3. **Serde attributes**: aliases and defaults for legacy document shapes
//! 4. **Error enums**: `thiserror` with a crate-local `Result` alias

pub mod document_store;
pub mod error;
pub mod lists;
pub mod memory;
pub mod snapshot;
pub mod social;
pub mod types;
pub mod usernames;

// Re-export commonly used types
pub use document_store::DocumentStore;
pub use error::{Result, StoreError};
pub use lists::{mark_watched, start_watching};
pub use memory::{Documents, MemoryStore};
pub use snapshot::validate_watched_item;
pub use social::{
    accept_friend_request, block_user, decline_friend_request, remove_friend,
    send_friend_request, unblock_user,
};
pub use types::{
    ContentId, ContentKey, ContentList, ListEntry, MAX_COMMENT_CHARS, MediaType,
    USERNAMES_DOC_ID, UserId, UserProfile, WatchedItem, content_key,
};
pub use usernames::{lookup_uid, rebuild_username_index};
