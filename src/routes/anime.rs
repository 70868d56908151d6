use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{Anime, AnimeId},
    services::catalog,
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

/// Handler for title search endpoint
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Anime>>> {
    let results = catalog::search_anime(state.catalog.as_ref(), &params.q).await?;
    Ok(Json(results))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<AnimeId>,
) -> AppResult<Json<Anime>> {
    let anime = catalog::get_anime(state.catalog.as_ref(), id).await?;
    Ok(Json(anime))
}
