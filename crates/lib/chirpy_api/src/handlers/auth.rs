//! Login and session token request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use chirpy_core::auth::extract::extract_bearer;
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::models::{CredentialsRequest, LoginResponse, RefreshResponse};
use crate::services::auth;

/// Pull the refresh token out of `Authorization: Bearer <token>`.
fn bearer_refresh_token(headers: &HeaderMap) -> AppResult<&str> {
    extract_bearer(headers).map_err(|e| {
        debug!(reason = %e, "refresh token header rejected");
        AppError::from(e)
    })
}

/// `POST /api/login`: authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<CredentialsRequest>,
) -> AppResult<Json<LoginResponse>> {
    let resp = auth::login(
        state.store.as_ref(),
        &state.config.auth,
        &body.email,
        &body.password,
    )
    .await?;
    Ok(Json(resp))
}

/// `POST /api/refresh`: exchange the bearer refresh token for an access token.
pub async fn refresh_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<RefreshResponse>> {
    let refresh_token = bearer_refresh_token(&headers)?;
    let resp = auth::refresh(state.store.as_ref(), &state.config.auth, refresh_token).await?;
    Ok(Json(resp))
}

/// `POST /api/revoke`: revoke the bearer refresh token.
pub async fn revoke_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    let refresh_token = bearer_refresh_token(&headers)?;
    auth::revoke(state.store.as_ref(), refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}
