use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use mtg_price_tracker::TrackerError;
use serde_json::json;

/// Unified error type that renders as a JSON `{"error": "..."}` response
/// with an appropriate HTTP status code.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub no_price_available: Option<bool>,
}

impl AppError {
    fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            no_price_available: None,
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn not_found(msg: impl Into<String>, no_price_available: bool) -> Self {
        Self {
            no_price_available: Some(no_price_available),
            ..Self::new(StatusCode::NOT_FOUND, msg)
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match self.no_price_available {
            Some(flag) => json!({ "error": self.message, "noPriceAvailable": flag }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<TrackerError> for AppError {
    fn from(e: TrackerError) -> Self {
        match &e {
            TrackerError::NotOwned { .. } => AppError::not_found(e.to_string(), false),
            TrackerError::NotFound(msg) => AppError::not_found(msg.clone(), true),
            TrackerError::InvalidArgument(msg) => AppError::bad_request(msg.clone()),
            _ => {
                tracing::error!(error = %e, "request failed");
                AppError::internal("Internal server error")
            }
        }
    }
}
