use crate::error::Result;
use crate::types::{ContentSummary, TimeWindow};
use async_trait::async_trait;
use store::{ContentId, MediaType};

/// Read-only access to the external content catalog.
///
/// Implementations report a non-2xx answer as an error; deciding whether a
/// failure is fatal is up to the caller.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Live details for one title
    async fn get_by_id(&self, media_type: MediaType, id: ContentId) -> Result<ContentSummary>;

    /// Titles the catalog considers similar (first page only)
    async fn get_similar(&self, media_type: MediaType, id: ContentId)
    -> Result<Vec<ContentSummary>>;

    /// Globally trending titles of one media type
    async fn get_trending(
        &self,
        media_type: MediaType,
        window: TimeWindow,
    ) -> Result<Vec<ContentSummary>>;
}
