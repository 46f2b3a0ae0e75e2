//! Error conversions
//!
//! HTTP rendering of [`AppError`] (feature `axum`).
//!
//! Every error body has the shape `{"message": "...", "error": "KIND"}`.

#[cfg(feature = "axum")]
use super::app_error::AppError;

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = serde_json::json!({
            "message": self.message(),
            "error": self.kind(),
        });

        (status, Json(body)).into_response()
    }
}
