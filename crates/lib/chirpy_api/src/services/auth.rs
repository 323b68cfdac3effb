//! Authentication service: registration, login, refresh, and revoke flows
//! built on `chirpy_core::auth`.

use chirpy_core::auth::password::{burn_verify, hash_password, verify_password};
use chirpy_core::auth::refresh as refresh_tokens;
use chirpy_core::auth::{AuthError, jwt};
use chirpy_core::config::AuthConfig;
use chirpy_core::store::Store;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{LoginResponse, RefreshResponse, UserResponse};

/// Message for every failed login, whichever half of the credentials was wrong.
const BAD_CREDENTIALS: &str = "Incorrect email or password";

fn validate_credentials(email: &str, password: &str) -> AppResult<()> {
    if email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".into()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("Password is required".into()));
    }
    Ok(())
}

/// Register a new user account.
pub async fn register(store: &dyn Store, email: &str, password: &str) -> AppResult<UserResponse> {
    validate_credentials(email, password)?;
    let pw_hash = hash_password(password)?;
    let user = store.create_user(email, &pw_hash).await?;
    info!(user_id = %user.id, "registered user");
    Ok(user.into())
}

/// Authenticate with email + password and mint an access/refresh token pair.
pub async fn login(
    store: &dyn Store,
    config: &AuthConfig,
    email: &str,
    password: &str,
) -> AppResult<LoginResponse> {
    let Some(user) = store.find_user_by_email(email).await? else {
        debug!("login for unknown email");
        burn_verify(password);
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
    };

    if !verify_password(password, &user.password_hash) {
        debug!(user_id = %user.id, "login with wrong password");
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
    }

    let token = jwt::issue_access_token(user.id, config.jwt_secret.as_bytes())?;
    let refresh_token = refresh_tokens::issue(store, user.id).await?;
    info!(user_id = %user.id, "user logged in");

    Ok(LoginResponse {
        user: user.into(),
        token,
        refresh_token,
    })
}

/// Exchange a refresh token for a new access token.
pub async fn refresh(
    store: &dyn Store,
    config: &AuthConfig,
    refresh_token: &str,
) -> AppResult<RefreshResponse> {
    let redeemed = refresh_tokens::redeem(store, refresh_token, config.rotation).await?;
    let token = jwt::issue_access_token(redeemed.user_id, config.jwt_secret.as_bytes())?;
    Ok(RefreshResponse {
        token,
        refresh_token: redeemed.refresh_token,
    })
}

/// Revoke a refresh token. Unknown tokens are rejected as unauthenticated.
pub async fn revoke(store: &dyn Store, refresh_token: &str) -> AppResult<()> {
    match refresh_tokens::revoke(store, refresh_token).await {
        Ok(()) => Ok(()),
        Err(AuthError::NotFound) => Err(AuthError::Unauthorized.into()),
        Err(e) => Err(e.into()),
    }
}

/// Change the caller's email and password.
///
/// The store revokes all of the user's refresh tokens in the same write, so
/// sessions started with the old password cannot mint new access tokens.
pub async fn update_credentials(
    store: &dyn Store,
    user_id: Uuid,
    email: &str,
    password: &str,
) -> AppResult<UserResponse> {
    validate_credentials(email, password)?;
    let pw_hash = hash_password(password)?;
    let user = store
        .update_user_credentials(user_id, email, &pw_hash)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    info!(%user_id, "updated user credentials");
    Ok(user.into())
}

/// Grant Chirpy Red to a user on behalf of the payment webhook.
pub async fn upgrade_to_red(store: &dyn Store, user_id: Uuid) -> AppResult<()> {
    if store.upgrade_user_to_red(user_id).await? {
        info!(%user_id, "user upgraded to chirpy red");
        Ok(())
    } else {
        Err(AppError::NotFound("User not found".into()))
    }
}
