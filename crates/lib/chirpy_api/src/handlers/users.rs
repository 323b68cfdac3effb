//! User account request handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CredentialsRequest, UserResponse};
use crate::services::auth;

/// `POST /api/users`: create a new user account.
pub async fn create_user_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = auth::register(state.store.as_ref(), &body.email, &body.password).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `PUT /api/users`: change the caller's email and password. Requires authentication.
pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    AppJson(body): AppJson<CredentialsRequest>,
) -> AppResult<Json<UserResponse>> {
    let user =
        auth::update_credentials(state.store.as_ref(), user_id, &body.email, &body.password)
            .await?;
    Ok(Json(user))
}
