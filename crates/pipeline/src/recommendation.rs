//! The final, flattened recommendation handed to callers.

use crate::reason::explain;
use serde::Serialize;
use sources::{Candidate, CandidateSource};
use store::{ContentId, ContentKey, MediaType, content_key};

/// One recommended title with its score and explanation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: ContentId,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub overview: Option<String>,
    pub popularity: Option<f64>,
    pub genre_ids: Vec<u32>,
    pub release_date: Option<String>,
    /// Tier score: summed `similarity * rating`, seed count or popularity
    pub score: f64,
    pub contributing_count: u32,
    pub reason: Option<String>,
    pub source: CandidateSource,
}

impl Recommendation {
    pub fn key(&self) -> ContentKey {
        content_key(self.media_type, self.id)
    }

    pub fn release_year(&self) -> Option<u16> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }

    pub fn is_social(&self) -> bool {
        self.source == CandidateSource::Social
    }
}

impl From<Candidate> for Recommendation {
    fn from(candidate: Candidate) -> Self {
        let reason = explain(&candidate.reasons);
        let content = candidate.content;
        Self {
            id: content.id,
            media_type: content.media_type,
            title: content.title,
            poster_path: content.poster_path,
            vote_average: content.vote_average,
            overview: content.overview,
            popularity: content.popularity,
            genre_ids: content.genre_ids,
            release_date: content.release_date,
            score: candidate.score,
            contributing_count: candidate.contributing_count,
            reason,
            source: candidate.source,
        }
    }
}
