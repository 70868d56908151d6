mod anime;
mod favorite;
mod recommendation;

pub use anime::{Anime, AnimeId};
pub use favorite::{FavoriteChange, ToggleFavoriteRequest, ToggleFavoriteResponse};
pub use recommendation::{
    CachedRecommendations, RecommendationOutcome, RecommendationResponse, ResultSource,
    RetryAfterResponse,
};

/// Identifier of an authenticated user
pub type UserId = uuid::Uuid;
