//! Wire shapes of the TMDB v3 API and their mapping into [`ContentSummary`].
//!
//! Movies and TV shows use different field names for the same data
//! (`title`/`name`, `release_date`/`first_air_date`); the DTO accepts both
//! and the media type is supplied by the endpoint that was called, since
//! `/similar` and `/trending/{type}` results don't always carry it.

use crate::types::ContentSummary;
use serde::Deserialize;
use store::{ContentId, MediaType};

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbTitle {
    pub id: ContentId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    /// Present on list results
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Present on detail responses
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbGenre {
    pub id: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbTitle>,
}

impl TmdbTitle {
    pub fn into_summary(self, media_type: MediaType) -> ContentSummary {
        let title = match media_type {
            MediaType::Movie => self.title.or(self.name),
            MediaType::Tv => self.name.or(self.title),
        }
        .unwrap_or_default();

        let genre_ids = if self.genre_ids.is_empty() {
            self.genres.into_iter().map(|g| g.id).collect()
        } else {
            self.genre_ids
        };

        ContentSummary {
            id: self.id,
            media_type,
            title,
            poster_path: self.poster_path,
            vote_average: self.vote_average,
            overview: self.overview.filter(|o| !o.is_empty()),
            popularity: self.popularity,
            genre_ids,
            release_date: self
                .release_date
                .or(self.first_air_date)
                .filter(|d| !d.is_empty()),
        }
    }
}

impl TmdbPage {
    pub fn into_summaries(self, media_type: MediaType) -> Vec<ContentSummary> {
        self.results
            .into_iter()
            .map(|title| title.into_summary(media_type))
            .collect()
    }
}
