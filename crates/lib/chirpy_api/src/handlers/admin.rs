//! Admin request handlers.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse};
use chirpy_core::auth::policy::authorize_admin;
use tracing::warn;

use crate::AppState;
use crate::error::AppResult;

/// `GET /admin/metrics`: file-server hit count as an HTML page.
pub async fn metrics_handler(State(state): State<AppState>) -> Html<String> {
    Html(format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>\n",
        state.metrics.file_server_hits()
    ))
}

/// `POST /admin/reset`: zero the hit counter and delete every user.
/// Only available when the deployment mode is `dev`.
pub async fn reset_handler(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    authorize_admin(&state.config.auth)?;
    state.metrics.reset();
    let deleted = state.store.delete_all_users().await?;
    warn!(deleted, "admin reset: hits zeroed and users deleted");
    Ok((
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Hits reset to 0 and database reset to initial state.",
    ))
}
