pub mod catalog;
pub mod dispersion;
pub mod recommendations;
pub mod scorer;
pub mod similarity;
pub mod stores;
pub mod text;

pub use recommendations::{RecommendationService, RecommendationSettings};
pub use scorer::{RecommendationScorer, ScorerConfig, TagUniverse};
pub use stores::{CandidateQuery, CatalogStore, FavoritesStore, RecommendationCache};
