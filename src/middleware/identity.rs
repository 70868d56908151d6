use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{error::AppError, models::UserId};

pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller's identity, taken from the `x-user-id` header
///
/// Session handling lives in front of this service; by the time a request
/// arrives here the header carries the authenticated user's UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("Missing x-user-id header".to_string()))?;

        raw.to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::Unauthorized("Invalid x-user-id header".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<AuthenticatedUser, AppError> {
        let mut builder = Request::builder().uri("/api/v1/recommendations");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthenticatedUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_header() {
        let header = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let user = tokio_test::assert_ok!(extract(Some(header)).await);
        assert_eq!(user.0, Uuid::parse_str(header).unwrap());
    }

    #[tokio::test]
    async fn test_missing_header() {
        let err = tokio_test::assert_err!(extract(None).await);
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_malformed_header() {
        let err = extract(Some("user-42")).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
