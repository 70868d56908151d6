use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    middleware::AuthenticatedUser,
    models::{Anime, ToggleFavoriteRequest, ToggleFavoriteResponse},
    services::catalog,
};

use super::AppState;

/// The caller's favorites in the order they were added
pub async fn list(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> AppResult<Json<Vec<Anime>>> {
    let liked = state.favorites.find_liked(user_id).await?;
    Ok(Json(liked))
}

/// Adds the anime to the caller's favorites, or removes it if already present
pub async fn toggle(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(request): Json<ToggleFavoriteRequest>,
) -> AppResult<Json<ToggleFavoriteResponse>> {
    let change = catalog::toggle_favorite(
        state.catalog.as_ref(),
        state.favorites.as_ref(),
        user_id,
        request.anime_id,
    )
    .await?;

    Ok(Json(ToggleFavoriteResponse::new(request.anime_id, change)))
}
