use serde::{Deserialize, Serialize};

use super::AnimeId;

/// Body of a favorite toggle request
#[derive(Debug, Deserialize)]
pub struct ToggleFavoriteRequest {
    pub anime_id: AnimeId,
}

/// What a toggle did to the user's liked set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteChange {
    Added,
    Removed,
}

impl FavoriteChange {
    pub fn message(&self) -> &'static str {
        match self {
            FavoriteChange::Added => "The anime has been added to favorites",
            FavoriteChange::Removed => "The anime has been removed from favorites",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ToggleFavoriteResponse {
    pub anime_id: AnimeId,
    pub change: FavoriteChange,
    pub message: &'static str,
}

impl ToggleFavoriteResponse {
    pub fn new(anime_id: AnimeId, change: FavoriteChange) -> Self {
        Self {
            anime_id,
            change,
            message: change.message(),
        }
    }
}
