use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use lister_core::UNSUPPORTED_SITE_MESSAGE;
use lister_core::error::AppError;

/// Wrapper so we can implement `IntoResponse` for `AppError`.
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // The form page answers unsupported URLs with a plain message, not an error status.
        if self.0.is_unsupported_site() {
            return (StatusCode::OK, UNSUPPORTED_SITE_MESSAGE).into_response();
        }

        let status = match &self.0 {
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            e if e.is_fetch_failure() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(error = %self.0, "Request failed");

        (status, self.0.to_string()).into_response()
    }
}
