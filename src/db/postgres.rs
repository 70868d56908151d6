use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    error::AppResult,
    models::{Anime, AnimeId, FavoriteChange, UserId},
    services::stores::{CandidateQuery, CatalogStore, FavoritesStore},
};

const ANIME_COLUMNS: &str =
    "a.id, a.title, a.title_eng, a.image_url, a.synopsis, a.episodes, a.aired, a.rating, a.genres";

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Catalog and favorites store backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Escapes LIKE wildcards so user text matches literally
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait::async_trait]
impl CatalogStore for PgStore {
    async fn find_by_id(&self, id: AnimeId) -> AppResult<Option<Anime>> {
        let sql = format!("SELECT {ANIME_COLUMNS} FROM anime a WHERE a.id = $1");
        let anime = sqlx::query_as::<_, Anime>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(anime)
    }

    async fn find_candidates(&self, query: &CandidateQuery) -> AppResult<Vec<Anime>> {
        let sql = format!(
            r#"
            SELECT {ANIME_COLUMNS}
            FROM anime a
            WHERE a.id <> ALL($1)
              AND a.episodes BETWEEN $2 AND $3
              AND a.aired BETWEEN $4 AND $5
            ORDER BY a.id
            "#
        );
        let candidates = sqlx::query_as::<_, Anime>(&sql)
            .bind(&query.excluded_ids)
            .bind(query.windows.episodes.lower)
            .bind(query.windows.episodes.upper)
            .bind(query.windows.aired.lower)
            .bind(query.windows.aired.upper)
            .fetch_all(&self.pool)
            .await?;

        Ok(candidates)
    }

    async fn search(&self, text: &str) -> AppResult<Vec<Anime>> {
        let sql = format!(
            r#"
            SELECT {ANIME_COLUMNS}
            FROM anime a
            WHERE a.title ILIKE $1 OR a.title_eng ILIKE $1
            ORDER BY a.id
            "#
        );
        let results = sqlx::query_as::<_, Anime>(&sql)
            .bind(like_pattern(text))
            .fetch_all(&self.pool)
            .await?;

        Ok(results)
    }
}

#[async_trait::async_trait]
impl FavoritesStore for PgStore {
    async fn find_liked(&self, user_id: UserId) -> AppResult<Vec<Anime>> {
        let sql = format!(
            r#"
            SELECT {ANIME_COLUMNS}
            FROM user_favorites f
            JOIN anime a ON a.id = f.anime_id
            WHERE f.user_id = $1
            ORDER BY f.id
            "#
        );
        let liked = sqlx::query_as::<_, Anime>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(liked)
    }

    async fn toggle_favorite(
        &self,
        user_id: UserId,
        anime_id: AnimeId,
    ) -> AppResult<FavoriteChange> {
        let removed = sqlx::query("DELETE FROM user_favorites WHERE user_id = $1 AND anime_id = $2")
            .bind(user_id)
            .bind(anime_id)
            .execute(&self.pool)
            .await?;

        if removed.rows_affected() > 0 {
            return Ok(FavoriteChange::Removed);
        }

        sqlx::query(
            "INSERT INTO user_favorites (user_id, anime_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(anime_id)
        .execute(&self.pool)
        .await?;

        Ok(FavoriteChange::Added)
    }
}
