//! Refresh token lifecycle: issue, lookup, revoke, and redeem.
//!
//! Tokens are 64 random alphanumeric characters handed to the client once.
//! Storage only ever sees their SHA-256 digest.

use chrono::{Duration, Utc};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::AuthError;
use crate::config::RotationPolicy;
use crate::models::auth::RefreshTokenRecord;
use crate::store::RefreshTokenStore;

/// Refresh token lifetime: 60 days.
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 60;

/// Length of a generated refresh token.
const REFRESH_TOKEN_LEN: usize = 64;

/// Result of redeeming a refresh token.
#[derive(Debug, Clone)]
pub struct Redeemed {
    pub user_id: Uuid,
    /// Replacement token, present only under [`RotationPolicy::Rotate`].
    pub refresh_token: Option<String>,
}

/// Generate a cryptographically random refresh token.
fn generate_refresh_token() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// SHA-256 hash a refresh token for storage.
fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Mint a refresh token for `user_id`, valid for 60 days.
pub async fn issue<S>(store: &S, user_id: Uuid) -> Result<String, AuthError>
where
    S: RefreshTokenStore + ?Sized,
{
    let token = generate_refresh_token();
    let expires_at = Utc::now() + Duration::days(REFRESH_TOKEN_EXPIRY_DAYS);
    store
        .insert_refresh_token(&hash_refresh_token(&token), user_id, expires_at)
        .await?;
    debug!(%user_id, %expires_at, "issued refresh token");
    Ok(token)
}

/// Fetch the stored record for `token`. `NotFound` if it was never issued.
pub async fn lookup<S>(store: &S, token: &str) -> Result<RefreshTokenRecord, AuthError>
where
    S: RefreshTokenStore + ?Sized,
{
    store
        .find_refresh_token(&hash_refresh_token(token))
        .await?
        .ok_or(AuthError::NotFound)
}

/// Mark `token` revoked. Revoking twice is fine; an unknown token is `NotFound`.
pub async fn revoke<S>(store: &S, token: &str) -> Result<(), AuthError>
where
    S: RefreshTokenStore + ?Sized,
{
    if store.revoke_refresh_token(&hash_refresh_token(token)).await? {
        Ok(())
    } else {
        Err(AuthError::NotFound)
    }
}

/// Revoke every live refresh token belonging to `user_id`.
pub async fn revoke_all_for_user<S>(store: &S, user_id: Uuid) -> Result<u64, AuthError>
where
    S: RefreshTokenStore + ?Sized,
{
    let revoked = store.revoke_user_refresh_tokens(user_id).await?;
    if revoked > 0 {
        info!(%user_id, revoked, "revoked refresh tokens");
    }
    Ok(revoked)
}

/// Exchange a refresh token for the identity it was issued to.
///
/// Unknown, expired, and revoked tokens all yield `Unauthorized`.
pub async fn redeem<S>(
    store: &S,
    token: &str,
    policy: RotationPolicy,
) -> Result<Redeemed, AuthError>
where
    S: RefreshTokenStore + ?Sized,
{
    let record = match lookup(store, token).await {
        Ok(record) => record,
        Err(AuthError::NotFound) => {
            debug!("refresh token not found");
            return Err(AuthError::Unauthorized);
        }
        Err(e) => return Err(e),
    };

    if !record.is_usable() {
        debug!(user_id = %record.user_id, revoked = record.revoked_at.is_some(), "refresh token not usable");
        return Err(AuthError::Unauthorized);
    }

    let refresh_token = match policy {
        RotationPolicy::Reuse => None,
        RotationPolicy::Rotate => Some(rotate(store, token, record.user_id).await?),
    };

    Ok(Redeemed {
        user_id: record.user_id,
        refresh_token,
    })
}

/// Swap `token` for a fresh one owned by `user_id`.
///
/// The replacement is stored before the old token is claimed, so a failed
/// insert leaves the old token usable. Only the caller whose claim wins keeps
/// its replacement; every other racer revokes its own and is turned away.
async fn rotate<S>(store: &S, token: &str, user_id: Uuid) -> Result<String, AuthError>
where
    S: RefreshTokenStore + ?Sized,
{
    let replacement = issue(store, user_id).await?;

    let claimed = store.claim_refresh_token(&hash_refresh_token(token)).await;
    match claimed {
        Ok(Some(_)) => {
            debug!(%user_id, "rotated refresh token");
            Ok(replacement)
        }
        Ok(None) => {
            debug!(%user_id, "refresh token already claimed");
            discard(store, &replacement, user_id).await;
            Err(AuthError::Unauthorized)
        }
        Err(e) => {
            discard(store, &replacement, user_id).await;
            Err(e.into())
        }
    }
}

/// Revoke a replacement token that lost its rotation.
async fn discard<S>(store: &S, replacement: &str, user_id: Uuid)
where
    S: RefreshTokenStore + ?Sized,
{
    if let Err(e) = revoke(store, replacement).await {
        warn!(%user_id, error = %e, "failed to revoke unused replacement refresh token");
    }
}
