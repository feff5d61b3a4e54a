//! Metadata client for the external content catalog.
//!
//! This crate provides:
//! - The [`MetadataProvider`] contract (details, similar titles, trending)
//! - [`TmdbClient`], an HTTP implementation against the TMDB v3 API
//! - [`ContentSummary`], the provider-neutral record every call returns
//!
//! Errors are typed ([`MetadataError`]) so callers can tell a transport
//! failure from a non-2xx answer and decide whether to degrade or abort.

mod dto;
pub mod error;
pub mod provider;
pub mod tmdb;
pub mod types;

pub use error::{MetadataError, Result};
pub use provider::MetadataProvider;
pub use tmdb::{DEFAULT_TMDB_API_URL, TmdbClient};
pub use types::{ContentSummary, TimeWindow};
