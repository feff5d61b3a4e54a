//! # Sources Crate
//!
//! This crate implements candidate generation for social recommendations.
//!
//! ## Components
//!
//! ### Similarity Engine & Neighbor Finder
//! - [`similarity`]: cosine similarity over the titles two users share
//! - [`NeighborFinder`]: scans users, boosts friends, keeps the top K
//!
//! ### Candidate Sources (tried in this order)
//! - [`SocialSource`]: "users who rate like you watched these"
//! - [`SimilarContentSource`]: provider similar-titles of your favourites
//! - [`TrendingSource`]: what's trending this week
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{NeighborFinder, SocialSource, user_context::build_user_context};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::load_from_file(path)?);
//! let context = build_user_context(store.as_ref(), "u1").await?;
//!
//! let neighbors = NeighborFinder::new(store.clone()).find_neighbors("u1", 15).await?;
//! let candidates = SocialSource::new().get_candidates(&context, &neighbors);
//! ```
//!
//! ## Learning Goals
//!
//! 1. **Async I/O seams**: stores and providers behind `Arc<dyn Trait>`
//! 2. **HashMap aggregation**: scoring buckets keyed by content key
//! 3. **Rayon in async code**: CPU work moved to `spawn_blocking`
//! 4. **Builder Pattern**: configurable sources with method chaining
//! 5. **Instrumentation**: `#[instrument]` spans on every source

pub mod content_based;
pub mod neighbors;
pub mod similarity;
pub mod social;
pub mod trending;
pub mod types;
pub mod user_context;

// Re-export commonly used types
pub use content_based::SimilarContentSource;
pub use neighbors::NeighborFinder;
pub use similarity::{RatingVector, common_items, cosine_similarity, rating_vector, similarity};
pub use social::SocialSource;
pub use trending::TrendingSource;
pub use types::{
    AlgorithmicLabel, Candidate, CandidateSource, Neighbor, ReasonEntry, UserContext,
    UserSnapshot,
};
