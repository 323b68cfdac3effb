//! Liveness check.

use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;

/// `GET /api/healthz`: plain-text liveness check.
pub async fn healthz_handler() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/plain; charset=utf-8")], "OK")
}
