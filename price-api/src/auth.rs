use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// Header carrying the authenticated user id, set by the session layer in
/// front of this service.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller. Rejects with 401 when the header is absent or blank.
#[derive(Debug, Clone)]
pub struct CallerId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for CallerId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| CallerId(v.to_string()))
            .ok_or_else(|| AppError::unauthorized("Unauthorized"))
    }
}
