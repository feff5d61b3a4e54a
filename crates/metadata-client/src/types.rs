//! Provider-neutral content records returned by every [`MetadataProvider`](crate::MetadataProvider).

use serde::{Deserialize, Serialize};
use store::{ContentId, ContentKey, MediaType, content_key};

/// Summary of one movie or TV show as known by the catalog
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    pub id: ContentId,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub overview: Option<String>,
    pub popularity: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// `YYYY-MM-DD`; first air date for TV
    pub release_date: Option<String>,
}

impl ContentSummary {
    pub fn new(id: ContentId, media_type: MediaType, title: impl Into<String>) -> Self {
        Self {
            id,
            media_type,
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_popularity(mut self, popularity: f64) -> Self {
        self.popularity = Some(popularity);
        self
    }

    pub fn with_vote_average(mut self, vote_average: f64) -> Self {
        self.vote_average = Some(vote_average);
        self
    }

    pub fn with_genres(mut self, genre_ids: Vec<u32>) -> Self {
        self.genre_ids = genre_ids;
        self
    }

    pub fn with_release_date(mut self, date: impl Into<String>) -> Self {
        self.release_date = Some(date.into());
        self
    }

    pub fn key(&self) -> ContentKey {
        content_key(self.media_type, self.id)
    }

    /// Year part of the release date, if it parses
    pub fn release_year(&self) -> Option<u16> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }
}

/// Time window for trending lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}
