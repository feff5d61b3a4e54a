//! Pipeline for filtering, explaining and finalizing recommendation candidates.
//!
//! This crate provides:
//! - Filter trait and implementations for candidate filtering
//! - FilterPipeline for composing filters
//! - The Reason Generator ([`explain`])
//! - [`Recommendation`], the flattened output type
//!
//! ## Architecture
//! The pipeline processes candidates in stages:
//! 1. Filters remove unwanted candidates (watched, listed, duplicates)
//! 2. The orchestrator ranks and truncates what's left
//! 3. Each survivor becomes a `Recommendation` with an explanation
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterPipeline, Recommendation};
//!
//! let filtered = FilterPipeline::exclusion().apply(candidates, &context)?;
//! let recs: Vec<Recommendation> = filtered.into_iter().map(Recommendation::from).collect();
//! ```

pub mod filter_pipeline;
pub mod filters;
pub mod reason;
pub mod recommendation;
pub mod traits;

// Re-export main types
pub use filter_pipeline::FilterPipeline;
pub use reason::explain;
pub use recommendation::Recommendation;
pub use traits::Filter;
