//! TMDB v3 implementation of [`MetadataProvider`].
//!
//! Endpoints used:
//! - `GET /{movie|tv}/{id}` for details
//! - `GET /{movie|tv}/{id}/similar?page=1`
//! - `GET /trending/{movie|tv}/{day|week}`
//!
//! The API key is sent as the `api_key` query parameter.

use crate::dto::{TmdbPage, TmdbTitle};
use crate::error::{MetadataError, Result};
use crate::provider::MetadataProvider;
use crate::types::{ContentSummary, TimeWindow};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use store::{ContentId, MediaType};
use tracing::{debug, instrument};

pub const DEFAULT_TMDB_API_URL: &str = "https://api.themoviedb.org/3";

/// HTTP client for the TMDB catalog
#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key: api_key.into(),
            api_url: DEFAULT_TMDB_API_URL.to_string(),
        }
    }

    /// Point the client at a different base URL (proxy, test server)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.api_url, path);
        debug!(path, "TMDB request");

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MetadataError::Status { status, body });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| MetadataError::Decode(format!("{path}: {e}")))
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    #[instrument(skip(self))]
    async fn get_by_id(&self, media_type: MediaType, id: ContentId) -> Result<ContentSummary> {
        let path = format!("/{}/{}", media_type.as_str(), id);
        let title: TmdbTitle = self.get_json(&path, &[]).await?;
        Ok(title.into_summary(media_type))
    }

    #[instrument(skip(self))]
    async fn get_similar(
        &self,
        media_type: MediaType,
        id: ContentId,
    ) -> Result<Vec<ContentSummary>> {
        let path = format!("/{}/{}/similar", media_type.as_str(), id);
        let page: TmdbPage = self.get_json(&path, &[("page", "1")]).await?;
        Ok(page.into_summaries(media_type))
    }

    #[instrument(skip(self))]
    async fn get_trending(
        &self,
        media_type: MediaType,
        window: TimeWindow,
    ) -> Result<Vec<ContentSummary>> {
        let path = format!("/trending/{}/{}", media_type.as_str(), window.as_str());
        let page: TmdbPage = self.get_json(&path, &[]).await?;
        Ok(page.into_summaries(media_type))
    }
}
