use crate::{
    error::{AppError, AppResult},
    models::{Anime, AnimeId, FavoriteChange, UserId},
    services::stores::{CatalogStore, FavoritesStore},
};

/// Shortest search text accepted, after trimming
pub const MIN_SEARCH_LEN: usize = 5;

/// Fetches a single anime, `NotFound` when the catalog has no such id
pub async fn get_anime(catalog: &dyn CatalogStore, id: AnimeId) -> AppResult<Anime> {
    catalog
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Anime {} not found", id)))
}

/// Searches the catalog by title
///
/// Rejects short queries and reports an empty result as `NotFound`.
pub async fn search_anime(catalog: &dyn CatalogStore, query: &str) -> AppResult<Vec<Anime>> {
    let query = query.trim();
    if query.chars().count() < MIN_SEARCH_LEN {
        return Err(AppError::InvalidInput(format!(
            "Search requires at least {} characters",
            MIN_SEARCH_LEN
        )));
    }

    let results = catalog.search(query).await?;
    tracing::debug!(query = %query, results = results.len(), "Catalog search");

    if results.is_empty() {
        return Err(AppError::NotFound(format!("Nothing found for '{}'", query)));
    }

    Ok(results)
}

/// Adds or removes an anime from the user's favorites
///
/// The anime must exist in the catalog. The change alters the user's liked-id
/// fingerprint, so the next recommendation request recomputes.
pub async fn toggle_favorite(
    catalog: &dyn CatalogStore,
    favorites: &dyn FavoritesStore,
    user_id: UserId,
    anime_id: AnimeId,
) -> AppResult<FavoriteChange> {
    get_anime(catalog, anime_id).await?;

    let change = favorites.toggle_favorite(user_id, anime_id).await?;
    tracing::info!(user_id = %user_id, anime_id, change = ?change, "Favorites updated");

    Ok(change)
}
