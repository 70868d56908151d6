use serde::{Deserialize, Serialize};

/// Catalog identifier of an anime
pub type AnimeId = i32;

/// An anime as stored in the catalog
///
/// The recommender only reads these. `episodes`, `aired`, `synopsis` and
/// `genres` feed the scoring; the rest is carried through to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Anime {
    pub id: AnimeId,
    pub title: String,
    pub title_eng: Option<String>,
    pub image_url: Option<String>,
    /// Free-text description, empty when the catalog has none
    pub synopsis: String,
    pub episodes: i32,
    /// Year the anime first aired
    pub aired: i32,
    pub rating: Option<String>,
    /// Genre tags, order is irrelevant
    pub genres: Vec<String>,
}

impl Anime {
    /// Minimal anime with only the scoring attributes set
    pub fn new(id: AnimeId, title: impl Into<String>, episodes: i32, aired: i32) -> Self {
        Self {
            id,
            title: title.into(),
            title_eng: None,
            image_url: None,
            synopsis: String::new(),
            episodes,
            aired,
            rating: None,
            genres: Vec::new(),
        }
    }

    pub fn with_synopsis(mut self, synopsis: impl Into<String>) -> Self {
        self.synopsis = synopsis.into();
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }
}
