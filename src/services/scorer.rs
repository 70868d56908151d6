//! Content-based ranking of candidate anime against a user's favorites.
//!
//! ## Algorithm
//! 1. Episode and air-year acceptance windows from the liked set
//! 2. Drop candidates outside either window (inclusive bounds)
//! 3. Genre similarity: cosine of the user's one-hot genre union against the
//!    candidate's one-hot genres, both over the same tag universe
//! 4. Synopsis similarity: for every liked synopsis, cosine of word counts
//!    over a dictionary built from just that pair; averaged over the liked set
//! 5. Score = genre similarity + synopsis similarity (unweighted sum)
//! 6. Stable sort by score descending, keep the top K

use std::borrow::Cow;
use std::cmp::Ordering;

use rayon::prelude::*;

use crate::models::Anime;
use crate::services::dispersion::{acceptance_window, AcceptanceWindow, LowerBound};
use crate::services::similarity::cosine_similarity;
use crate::services::text::{tag_vector, Dictionary, StopWords};

/// Tag universe used for one-hot genre vectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagUniverse {
    /// A fixed, ordered genre list
    Fixed(Vec<String>),
    /// Every genre seen in the liked items and surviving candidates, in first-seen order
    Observed,
}

impl TagUniverse {
    fn resolve<'a>(&'a self, liked: &[Anime], candidates: &[Anime]) -> Cow<'a, [String]> {
        match self {
            TagUniverse::Fixed(genres) => Cow::Borrowed(genres.as_slice()),
            TagUniverse::Observed => {
                let mut universe: Vec<String> = Vec::new();
                for genre in liked.iter().chain(candidates).flat_map(|a| &a.genres) {
                    if !universe.contains(genre) {
                        universe.push(genre.clone());
                    }
                }
                Cow::Owned(universe)
            }
        }
    }
}

/// Scorer settings, passed in explicitly rather than read from globals
#[derive(Debug, Clone, PartialEq)]
pub struct ScorerConfig {
    pub tag_universe: TagUniverse,
    /// Number of candidates kept after ranking
    pub top_k: usize,
    pub stop_words: StopWords,
}

/// Episode and air-year windows derived from one liked set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptanceWindows {
    pub episodes: AcceptanceWindow,
    pub aired: AcceptanceWindow,
}

impl AcceptanceWindows {
    pub fn from_liked(liked: &[Anime]) -> Self {
        let episodes: Vec<f64> = liked.iter().map(|a| f64::from(a.episodes)).collect();
        let aired: Vec<f64> = liked.iter().map(|a| f64::from(a.aired)).collect();

        Self {
            episodes: acceptance_window(&episodes, LowerBound::AtLeastOne),
            aired: acceptance_window(&aired, LowerBound::Unclamped),
        }
    }

    pub fn admits(&self, anime: &Anime) -> bool {
        self.episodes.contains(anime.episodes) && self.aired.contains(anime.aired)
    }
}

/// A candidate with its similarity to the user's favorites
///
/// `score` is the sum of two cosines, so it ranges over [0, 2].
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub anime: Anime,
    pub genre_similarity: f64,
    pub synopsis_similarity: f64,
    pub score: f64,
}

/// Stateless content-based scorer
///
/// Holds only configuration, so one instance can be shared across
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct RecommendationScorer {
    config: ScorerConfig,
}

impl RecommendationScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    pub fn acceptance_windows(&self, liked: &[Anime]) -> AcceptanceWindows {
        AcceptanceWindows::from_liked(liked)
    }

    /// Filters, scores and ranks `candidates`, keeping the top K
    ///
    /// `candidates` must not contain any liked anime. Equal scores keep their
    /// input order. Returns nothing for an empty liked set.
    pub fn rank(&self, liked: &[Anime], candidates: Vec<Anime>) -> Vec<ScoredCandidate> {
        if liked.is_empty() {
            tracing::debug!("No liked anime, nothing to rank");
            return Vec::new();
        }

        let windows = self.acceptance_windows(liked);
        let input_count = candidates.len();
        let candidates: Vec<Anime> = candidates
            .into_iter()
            .filter(|anime| windows.admits(anime))
            .collect();

        tracing::debug!(
            input = input_count,
            admitted = candidates.len(),
            episodes = ?windows.episodes,
            aired = ?windows.aired,
            "Applied acceptance windows"
        );

        let universe = self.config.tag_universe.resolve(liked, &candidates);
        let liked_genres: Vec<&str> = liked
            .iter()
            .flat_map(|a| a.genres.iter().map(String::as_str))
            .collect();
        let user_genres = tag_vector(&liked_genres, &universe);

        let mut scored: Vec<ScoredCandidate> = candidates
            .into_par_iter()
            .map(|anime| self.score_single(anime, liked, &user_genres, &universe))
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(self.config.top_k);
        scored
    }

    /// Ranked anime without their scores
    pub fn recommend(&self, liked: &[Anime], candidates: Vec<Anime>) -> Vec<Anime> {
        self.rank(liked, candidates)
            .into_iter()
            .map(|scored| scored.anime)
            .collect()
    }

    fn score_single(
        &self,
        anime: Anime,
        liked: &[Anime],
        user_genres: &[u8],
        universe: &[String],
    ) -> ScoredCandidate {
        let genre_similarity = cosine_similarity(user_genres, &tag_vector(&anime.genres, universe));
        let synopsis_similarity = self.average_synopsis_similarity(&anime.synopsis, liked);

        ScoredCandidate {
            score: genre_similarity + synopsis_similarity,
            genre_similarity,
            synopsis_similarity,
            anime,
        }
    }

    fn average_synopsis_similarity(&self, synopsis: &str, liked: &[Anime]) -> f64 {
        let stop_words = self.config.stop_words;
        let total: f64 = liked
            .iter()
            .map(|favorite| {
                let dictionary =
                    Dictionary::build([favorite.synopsis.as_str(), synopsis], stop_words);
                cosine_similarity(
                    &dictionary.vectorize(&favorite.synopsis, stop_words),
                    &dictionary.vectorize(synopsis, stop_words),
                )
            })
            .sum();

        total / liked.len() as f64
    }
}
