use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::{
    config::{Config, RefreshPolicy},
    error::{AppError, AppResult},
    models::{Anime, AnimeId, CachedRecommendations, RecommendationOutcome, ResultSource, UserId},
    services::{
        scorer::RecommendationScorer,
        stores::{CandidateQuery, CatalogStore, FavoritesStore, RecommendationCache},
    },
};

/// Policy values for the recommendation flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationSettings {
    pub min_liked_items: usize,
    pub cache_ttl: Duration,
    pub refresh_policy: RefreshPolicy,
}

impl From<&Config> for RecommendationSettings {
    fn from(config: &Config) -> Self {
        Self {
            min_liked_items: config.min_liked_items,
            cache_ttl: config.cache_ttl(),
            refresh_policy: config.refresh_policy,
        }
    }
}

/// Serves per-user recommendations, memoized in the recommendation cache
///
/// A cached ranking is reused while the user's liked-id sequence is exactly
/// the one that produced it. Any change to the liked set (add, remove,
/// reorder) makes the entry stale; the cache store's TTL bounds it otherwise.
#[derive(Clone)]
pub struct RecommendationService {
    catalog: Arc<dyn CatalogStore>,
    favorites: Arc<dyn FavoritesStore>,
    cache: Arc<dyn RecommendationCache>,
    scorer: Arc<RecommendationScorer>,
    settings: RecommendationSettings,
}

impl RecommendationService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        favorites: Arc<dyn FavoritesStore>,
        cache: Arc<dyn RecommendationCache>,
        scorer: RecommendationScorer,
        settings: RecommendationSettings,
    ) -> Self {
        Self {
            catalog,
            favorites,
            cache,
            scorer: Arc::new(scorer),
            settings,
        }
    }

    /// Returns the user's ranked recommendations
    ///
    /// # Errors
    /// * `InsufficientData` when the user has fewer favorites than required
    /// * `Database` / `Cache` when a store is unavailable
    #[instrument(skip(self))]
    pub async fn get_recommendations(&self, user_id: UserId) -> AppResult<RecommendationOutcome> {
        let start = Instant::now();

        // Independent reads, both needed before the freshness check
        let (cached, liked) = tokio::join!(
            self.cache.get(user_id),
            self.favorites.find_liked(user_id)
        );
        let (cached, liked) = (cached?, liked?);
        let liked_ids: Vec<AnimeId> = liked.iter().map(|anime| anime.id).collect();

        if let Some(entry) = cached {
            if entry.matches_fingerprint(&liked_ids) {
                tracing::debug!(liked = liked_ids.len(), "Recommendation cache hit");
                let expires_at = self.cached_expiry(user_id).await;
                return Ok(RecommendationOutcome::Ready {
                    recommendations: entry.recommendations,
                    source: ResultSource::Cache,
                    expires_at,
                });
            }

            if self.settings.refresh_policy == RefreshPolicy::TtlLocked {
                if let Some(remaining) = self.cache.remaining_ttl(user_id).await? {
                    let available_at = add_duration(Utc::now(), remaining);
                    if let Some(available_at) = available_at.filter(|_| !remaining.is_zero()) {
                        tracing::info!(%available_at, "Liked set changed, recomputation locked");
                        return Ok(RecommendationOutcome::RetryAfter { available_at });
                    }
                }
            }

            tracing::info!(
                cached_liked = entry.liked_ids.len(),
                liked = liked_ids.len(),
                "Liked set changed, recomputing recommendations"
            );
        } else {
            tracing::debug!("Recommendation cache miss");
        }

        if liked.len() < self.settings.min_liked_items {
            return Err(AppError::InsufficientData {
                found: liked.len(),
                required: self.settings.min_liked_items,
            });
        }

        let recommendations = self.compute(liked, liked_ids.clone()).await?;

        let entry = CachedRecommendations::new(liked_ids, recommendations);
        self.cache.put(user_id, &entry, self.settings.cache_ttl);
        let expires_at = add_duration(entry.computed_at, self.settings.cache_ttl);

        tracing::info!(
            count = entry.recommendations.len(),
            elapsed = ?start.elapsed(),
            "Recommendations computed"
        );

        Ok(RecommendationOutcome::Ready {
            recommendations: entry.recommendations,
            source: ResultSource::Fresh,
            expires_at,
        })
    }

    /// Queries the candidate pool and ranks it on a blocking thread
    async fn compute(&self, liked: Vec<Anime>, liked_ids: Vec<AnimeId>) -> AppResult<Vec<Anime>> {
        let query = CandidateQuery {
            excluded_ids: liked_ids,
            windows: self.scorer.acceptance_windows(&liked),
        };
        let candidates = self.catalog.find_candidates(&query).await?;

        tracing::debug!(
            liked = liked.len(),
            candidates = candidates.len(),
            episodes = ?query.windows.episodes,
            aired = ?query.windows.aired,
            "Fetched candidate pool"
        );

        let scorer = self.scorer.clone();
        tokio::task::spawn_blocking(move || scorer.recommend(&liked, candidates))
            .await
            .map_err(|e| AppError::Internal(format!("Scoring task failed: {}", e)))
    }

    /// Expiry of the user's cached entry, for display only
    async fn cached_expiry(&self, user_id: UserId) -> Option<DateTime<Utc>> {
        match self.cache.remaining_ttl(user_id).await {
            Ok(remaining) => remaining.and_then(|ttl| add_duration(Utc::now(), ttl)),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read remaining cache TTL");
                None
            }
        }
    }
}

fn add_duration(base: DateTime<Utc>, duration: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(duration)
        .ok()
        .and_then(|delta| base.checked_add_signed(delta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scorer::{ScorerConfig, TagUniverse};
    use crate::services::stores::{MockCatalogStore, MockFavoritesStore, MockRecommendationCache};
    use crate::services::text::StopWords;
    use mockall::predicate::eq;
    use uuid::Uuid;

    const TTL: Duration = Duration::from_secs(3600);

    fn liked_anime() -> Vec<Anime> {
        vec![
            Anime::new(1, "Liked A", 12, 2010)
                .with_genres(["Action"])
                .with_synopsis("giant robots"),
            Anime::new(2, "Liked B", 24, 2012).with_genres(["Action", "Drama"]),
            Anime::new(3, "Liked C", 12, 2014).with_genres(["Drama"]),
        ]
    }

    fn candidate_pool() -> Vec<Anime> {
        vec![
            Anime::new(10, "Drama pick", 13, 2012).with_genres(["Drama"]),
            Anime::new(11, "Action pick", 13, 2012)
                .with_genres(["Action", "Drama"])
                .with_synopsis("giant robots"),
        ]
    }

    fn settings(refresh_policy: RefreshPolicy) -> RecommendationSettings {
        RecommendationSettings {
            min_liked_items: 3,
            cache_ttl: TTL,
            refresh_policy,
        }
    }

    fn service(
        catalog: MockCatalogStore,
        favorites: MockFavoritesStore,
        cache: MockRecommendationCache,
        refresh_policy: RefreshPolicy,
    ) -> RecommendationService {
        let scorer = RecommendationScorer::new(ScorerConfig {
            tag_universe: TagUniverse::Fixed(vec!["Action".to_string(), "Drama".to_string()]),
            top_k: 5,
            stop_words: StopWords::None,
        });
        RecommendationService::new(
            Arc::new(catalog),
            Arc::new(favorites),
            Arc::new(cache),
            scorer,
            settings(refresh_policy),
        )
    }

    fn favorites_returning(liked: Vec<Anime>) -> MockFavoritesStore {
        let mut favorites = MockFavoritesStore::new();
        favorites
            .expect_find_liked()
            .returning(move |_| Ok(liked.clone()));
        favorites
    }

    fn ready_ids(outcome: &RecommendationOutcome) -> (Vec<AnimeId>, ResultSource) {
        match outcome {
            RecommendationOutcome::Ready {
                recommendations,
                source,
                ..
            } => (recommendations.iter().map(|a| a.id).collect(), *source),
            other => panic!("expected a ready outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cache_miss_computes_and_stores() {
        let user_id = Uuid::new_v4();

        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_candidates()
            .withf(|query| query.excluded_ids == vec![1, 2, 3])
            .times(1)
            .returning(|_| Ok(candidate_pool()));

        let mut cache = MockRecommendationCache::new();
        cache.expect_get().with(eq(user_id)).returning(|_| Ok(None));
        cache
            .expect_put()
            .withf(move |user, entry, ttl| {
                *user == user_id
                    && entry.liked_ids == vec![1, 2, 3]
                    && entry.recommendations.iter().map(|a| a.id).collect::<Vec<_>>()
                        == vec![11, 10]
                    && *ttl == TTL
            })
            .times(1)
            .return_const(());

        let service = service(
            catalog,
            favorites_returning(liked_anime()),
            cache,
            RefreshPolicy::OnChange,
        );
        let outcome = service.get_recommendations(user_id).await.unwrap();

        assert_eq!(ready_ids(&outcome), (vec![11, 10], ResultSource::Fresh));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_recomputation() {
        let user_id = Uuid::new_v4();
        let cached = vec![Anime::new(42, "Cached pick", 12, 2012)];

        let mut catalog = MockCatalogStore::new();
        catalog.expect_find_candidates().times(0);

        let mut cache = MockRecommendationCache::new();
        let entry = CachedRecommendations::new(vec![1, 2, 3], cached.clone());
        cache.expect_get().returning(move |_| Ok(Some(entry.clone())));
        cache
            .expect_remaining_ttl()
            .returning(|_| Ok(Some(Duration::from_secs(60))));
        cache.expect_put().times(0);

        let service = service(
            catalog,
            favorites_returning(liked_anime()),
            cache,
            RefreshPolicy::OnChange,
        );
        let outcome = service.get_recommendations(user_id).await.unwrap();

        match outcome {
            RecommendationOutcome::Ready {
                recommendations,
                source,
                expires_at,
            } => {
                assert_eq!(recommendations, cached);
                assert_eq!(source, ResultSource::Cache);
                assert!(expires_at.unwrap() > Utc::now());
            }
            other => panic!("expected cache hit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_changed_liked_set_recomputes() {
        let user_id = Uuid::new_v4();

        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_candidates()
            .times(1)
            .returning(|_| Ok(candidate_pool()));

        let mut cache = MockRecommendationCache::new();
        let stale = CachedRecommendations::new(vec![1, 2], vec![Anime::new(42, "Old", 12, 2012)]);
        cache.expect_get().returning(move |_| Ok(Some(stale.clone())));
        cache
            .expect_put()
            .withf(|_, entry, _| entry.liked_ids == vec![1, 2, 3])
            .times(1)
            .return_const(());

        let service = service(
            catalog,
            favorites_returning(liked_anime()),
            cache,
            RefreshPolicy::OnChange,
        );
        let outcome = service.get_recommendations(user_id).await.unwrap();

        assert_eq!(ready_ids(&outcome), (vec![11, 10], ResultSource::Fresh));
    }

    #[tokio::test]
    async fn test_ttl_locked_policy_defers_recomputation() {
        let user_id = Uuid::new_v4();

        let mut catalog = MockCatalogStore::new();
        catalog.expect_find_candidates().times(0);

        let mut cache = MockRecommendationCache::new();
        let stale = CachedRecommendations::new(vec![1, 2], vec![]);
        cache.expect_get().returning(move |_| Ok(Some(stale.clone())));
        cache
            .expect_remaining_ttl()
            .returning(|_| Ok(Some(Duration::from_secs(3600))));
        cache.expect_put().times(0);

        let service = service(
            catalog,
            favorites_returning(liked_anime()),
            cache,
            RefreshPolicy::TtlLocked,
        );
        let before = Utc::now();
        let outcome = service.get_recommendations(user_id).await.unwrap();

        match outcome {
            RecommendationOutcome::RetryAfter { available_at } => {
                assert!(available_at >= before + chrono::Duration::seconds(3599));
            }
            other => panic!("expected retry-after, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_insufficient_favorites() {
        let mut catalog = MockCatalogStore::new();
        catalog.expect_find_candidates().times(0);

        let mut cache = MockRecommendationCache::new();
        cache.expect_get().returning(|_| Ok(None));
        cache.expect_put().times(0);

        let liked = liked_anime().into_iter().take(2).collect();
        let service = service(
            catalog,
            favorites_returning(liked),
            cache,
            RefreshPolicy::OnChange,
        );
        let err = service.get_recommendations(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::InsufficientData {
                found: 2,
                required: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_cache_read_failure_is_retryable() {
        let mut cache = MockRecommendationCache::new();
        cache.expect_get().returning(|_| {
            Err(AppError::Cache(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "connection refused",
            ))))
        });

        let service = service(
            MockCatalogStore::new(),
            favorites_returning(liked_anime()),
            cache,
            RefreshPolicy::OnChange,
        );
        let err = service.get_recommendations(Uuid::new_v4()).await.unwrap_err();

        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_catalog_failure_writes_nothing() {
        let mut catalog = MockCatalogStore::new();
        catalog
            .expect_find_candidates()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let mut cache = MockRecommendationCache::new();
        cache.expect_get().returning(|_| Ok(None));
        cache.expect_put().times(0);

        let service = service(
            catalog,
            favorites_returning(liked_anime()),
            cache,
            RefreshPolicy::OnChange,
        );
        let err = service.get_recommendations(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
    }
}
