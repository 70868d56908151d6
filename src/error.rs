use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Add at least {required} favorites to get recommendations (currently {found})")]
    InsufficientData { found: usize, required: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the caller may retry the same request later
    ///
    /// Only store outages qualify. Retries themselves are left to the store
    /// clients and to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Database(_) | AppError::Cache(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::InsufficientData { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::Database(_) | AppError::Cache(_) => {
                tracing::error!(error = %self, "Upstream store unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message() {
        let err = AppError::InsufficientData {
            found: 1,
            required: 3,
        };
        assert_eq!(
            err.to_string(),
            "Add at least 3 favorites to get recommendations (currently 1)"
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_store_errors_are_retryable() {
        let err = AppError::Database(sqlx::Error::PoolTimedOut);
        assert!(err.is_retryable());
        assert!(!AppError::NotFound("anime 1".to_string()).is_retryable());
    }

    #[test]
    fn test_status_codes() {
        let cases = vec![
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (
                AppError::InsufficientData {
                    found: 0,
                    required: 3,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::Database(sqlx::Error::PoolClosed),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
