//! Filter implementations for the candidate pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod already_watched;
pub mod dedup;
pub mod list_exclusion;

// Re-export for convenience
pub use already_watched::AlreadyWatchedFilter;
pub use dedup::DedupFilter;
pub use list_exclusion::ListExclusionFilter;
