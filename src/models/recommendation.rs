use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Anime, AnimeId};

/// Cached ranking for one user
///
/// `liked_ids` is the exact liked-id sequence that produced `recommendations`.
/// Both are serialized into a single value so they are always written together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedRecommendations {
    pub liked_ids: Vec<AnimeId>,
    pub recommendations: Vec<Anime>,
    pub computed_at: DateTime<Utc>,
}

impl CachedRecommendations {
    pub fn new(liked_ids: Vec<AnimeId>, recommendations: Vec<Anime>) -> Self {
        Self {
            liked_ids,
            recommendations,
            computed_at: Utc::now(),
        }
    }

    /// True when the entry was computed from exactly this liked-id sequence
    ///
    /// Compares length and every element in order.
    pub fn matches_fingerprint(&self, liked_ids: &[AnimeId]) -> bool {
        self.liked_ids.as_slice() == liked_ids
    }
}

/// Where a returned ranking came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Fresh,
    Cache,
}

/// Result of a recommendation request
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationOutcome {
    /// A ranking is available
    Ready {
        recommendations: Vec<Anime>,
        source: ResultSource,
        /// When the cached copy of this ranking expires, if known
        expires_at: Option<DateTime<Utc>>,
    },
    /// The liked set changed but the refresh policy keeps the old entry alive
    RetryAfter { available_at: DateTime<Utc> },
}

/// JSON body for a ready ranking
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<Anime>,
    pub source: ResultSource,
    pub expires_at: Option<DateTime<Utc>>,
}

/// JSON body returned while recomputation is locked
#[derive(Debug, Serialize, Deserialize)]
pub struct RetryAfterResponse {
    pub message: String,
    pub available_at: DateTime<Utc>,
}
