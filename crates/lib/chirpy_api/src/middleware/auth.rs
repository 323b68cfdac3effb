//! Authentication middleware: bearer access tokens and the webhook API key.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chirpy_core::auth::policy::{authenticate, authorize_webhook};
use uuid::Uuid;

use crate::AppState;
use crate::error::AppError;

/// Caller identity stored in request extensions by [`require_auth`].
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

/// Axum middleware: extracts `Authorization: Bearer <token>`, validates the
/// access token, and injects `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = authenticate(
        request.headers(),
        state.config.auth.jwt_secret.as_bytes(),
    )?;
    request.extensions_mut().insert(AuthenticatedUser(user_id));
    Ok(next.run(request).await)
}

/// Axum middleware: admits only requests carrying the Polka API key.
pub async fn require_polka_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize_webhook(request.headers(), &state.config.auth.polka_key)?;
    Ok(next.run(request).await)
}
