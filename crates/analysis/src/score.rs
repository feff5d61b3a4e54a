//! Score labels and the weighted combiner.
//!
//! Every analysis exposes one headline metric in [0, 1]. The combiner
//! weights them into an overall score:
//!
//! | dimension | headline metric | weight |
//! |---|---|---|
//! | similarity | mean similarity | 0.25 |
//! | quality | diversity score | 0.25 |
//! | performance | performance score | 0.20 |
//! | social | social-influence score | 0.15 |
//! | cold start | reliability | 0.15 |

use serde::Serialize;
use std::fmt;

/// Qualitative bucket for a score in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreLabel {
    Excellent,
    Good,
    Fair,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
}

impl ScoreLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ScoreLabel::Excellent
        } else if score >= 0.6 {
            ScoreLabel::Good
        } else if score >= 0.4 {
            ScoreLabel::Fair
        } else if score >= 0.2 {
            ScoreLabel::Poor
        } else {
            ScoreLabel::VeryPoor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreLabel::Excellent => "Excellent",
            ScoreLabel::Good => "Good",
            ScoreLabel::Fair => "Fair",
            ScoreLabel::Poor => "Poor",
            ScoreLabel::VeryPoor => "Very Poor",
        }
    }
}

impl fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weight of each dimension in the overall score; sums to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub similarity: f64,
    pub quality: f64,
    pub performance: f64,
    pub social: f64,
    pub cold_start: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            similarity: 0.25,
            quality: 0.25,
            performance: 0.20,
            social: 0.15,
            cold_start: 0.15,
        }
    }
}

/// Headline metric of each analysis; a missing analysis scores 0
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScores {
    pub similarity: f64,
    pub quality: f64,
    pub performance: f64,
    pub social: f64,
    pub cold_start: f64,
}

impl DimensionScores {
    /// Weighted sum, clamped to [0, 1]. Non-finite inputs count as 0.
    pub fn combine(&self, weights: &ScoreWeights) -> f64 {
        let term = |score: f64, weight: f64| {
            if score.is_finite() {
                score.clamp(0.0, 1.0) * weight
            } else {
                0.0
            }
        };

        let total = term(self.similarity, weights.similarity)
            + term(self.quality, weights.quality)
            + term(self.performance, weights.performance)
            + term(self.social, weights.social)
            + term(self.cold_start, weights.cold_start);
        total.clamp(0.0, 1.0)
    }

    pub fn labels(&self) -> DimensionLabels {
        DimensionLabels {
            similarity: ScoreLabel::from_score(self.similarity),
            quality: ScoreLabel::from_score(self.quality),
            performance: ScoreLabel::from_score(self.performance),
            social: ScoreLabel::from_score(self.social),
            cold_start: ScoreLabel::from_score(self.cold_start),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionLabels {
    pub similarity: ScoreLabel,
    pub quality: ScoreLabel,
    pub performance: ScoreLabel,
    pub social: ScoreLabel,
    pub cold_start: ScoreLabel,
}
