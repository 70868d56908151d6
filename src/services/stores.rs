//! Collaborator store contracts
//!
//! The recommender never talks to PostgreSQL or Redis directly. It goes
//! through these traits so the backing stores can be swapped, and so the
//! orchestration can be tested against mocks or in-memory stores.
use std::time::Duration;

use crate::{
    error::AppResult,
    models::{Anime, AnimeId, CachedRecommendations, FavoriteChange, UserId},
    services::scorer::AcceptanceWindows,
};

/// Filter for the candidate pool query
///
/// Matches anime whose id is not in `excluded_ids` and whose episode count
/// and air year both fall inside the windows (inclusive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateQuery {
    pub excluded_ids: Vec<AnimeId>,
    pub windows: AcceptanceWindows,
}

impl CandidateQuery {
    pub fn matches(&self, anime: &Anime) -> bool {
        !self.excluded_ids.contains(&anime.id) && self.windows.admits(anime)
    }
}

/// Read access to the anime catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_by_id(&self, id: AnimeId) -> AppResult<Option<Anime>>;

    /// Candidate pool for scoring, in a stable order
    async fn find_candidates(&self, query: &CandidateQuery) -> AppResult<Vec<Anime>>;

    /// Case-insensitive substring search over title and English title
    async fn search(&self, text: &str) -> AppResult<Vec<Anime>>;
}

/// Per-user liked set
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FavoritesStore: Send + Sync {
    /// The user's liked anime in insertion order
    async fn find_liked(&self, user_id: UserId) -> AppResult<Vec<Anime>>;

    /// Adds the anime to the liked set, or removes it if already there
    async fn toggle_favorite(&self, user_id: UserId, anime_id: AnimeId)
        -> AppResult<FavoriteChange>;
}

/// Per-user store for computed rankings
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationCache: Send + Sync {
    /// The live entry for this user, if any; expired entries are absent
    async fn get(&self, user_id: UserId) -> AppResult<Option<CachedRecommendations>>;

    /// Stores the entry with a TTL without waiting for the write
    ///
    /// Failures are logged by the implementation and never reach the caller.
    fn put(&self, user_id: UserId, entry: &CachedRecommendations, ttl: Duration);

    /// Time left before the user's entry expires, `None` when there is no entry
    async fn remaining_ttl(&self, user_id: UserId) -> AppResult<Option<Duration>>;
}
