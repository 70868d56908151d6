use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::{
    error::AppResult,
    middleware::AuthenticatedUser,
    models::{RecommendationOutcome, RecommendationResponse, RetryAfterResponse},
};

use super::AppState;

/// Handler for recommendations endpoint
///
/// Answers 429 with a `Retry-After` header when the refresh policy keeps an
/// older ranking locked.
pub async fn recommend(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> AppResult<Response> {
    let outcome = state.recommendations.get_recommendations(user_id).await?;

    let response = match outcome {
        RecommendationOutcome::Ready {
            recommendations,
            source,
            expires_at,
        } => Json(RecommendationResponse {
            recommendations,
            source,
            expires_at,
        })
        .into_response(),
        RecommendationOutcome::RetryAfter { available_at } => {
            let wait_secs = (available_at - Utc::now()).num_seconds().max(0);
            let body = RetryAfterResponse {
                message: format!(
                    "Favorites changed; new recommendations available at {}",
                    available_at.to_rfc3339()
                ),
                available_at,
            };

            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            if let Ok(value) = HeaderValue::from_str(&wait_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
    };

    Ok(response)
}
