//! Request-level authorization policies.
//!
//! Each policy answers one question for a handler: who the caller is,
//! whether they own a resource, whether they are the trusted webhook sender,
//! and whether admin operations are enabled in this deployment.

use http::HeaderMap;
use subtle::ConstantTimeEq;
use tracing::debug;
use uuid::Uuid;

use super::AuthError;
use super::extract::{extract_api_key, extract_bearer};
use super::jwt::validate_access_token;
use crate::config::AuthConfig;

/// Identity policy: resolve the caller from a bearer access token.
///
/// Header and token failures are logged with their specific kind and
/// returned as a single `Unauthorized`.
pub fn authenticate(headers: &HeaderMap, jwt_secret: &[u8]) -> Result<Uuid, AuthError> {
    extract_bearer(headers)
        .and_then(|token| validate_access_token(token, jwt_secret))
        .map_err(|e| {
            debug!(reason = %e, "access token rejected");
            AuthError::Unauthorized
        })
}

/// Ownership policy: only the owner may act on a resource.
///
/// Callers must have confirmed the resource exists first.
pub fn authorize_owner(caller: Uuid, owner: Uuid) -> Result<(), AuthError> {
    if caller == owner {
        Ok(())
    } else {
        debug!(%caller, %owner, "ownership check failed");
        Err(AuthError::Forbidden("not the owner of this resource".into()))
    }
}

/// Exact, constant-time comparison of a presented key with the configured one.
///
/// An empty configured key matches nothing.
pub fn api_key_matches(presented: &str, configured: &str) -> bool {
    !configured.is_empty() && bool::from(presented.as_bytes().ct_eq(configured.as_bytes()))
}

/// Trusted-webhook policy: `Authorization: ApiKey <key>` must carry the
/// configured shared secret.
pub fn authorize_webhook(headers: &HeaderMap, configured_key: &str) -> Result<(), AuthError> {
    let presented = extract_api_key(headers).map_err(|e| {
        debug!(reason = %e, "webhook api key rejected");
        AuthError::Unauthorized
    })?;
    if api_key_matches(presented, configured_key) {
        Ok(())
    } else {
        debug!("webhook api key mismatch");
        Err(AuthError::Unauthorized)
    }
}

/// Privileged-admin policy: allowed only in the `dev` deployment mode.
pub fn authorize_admin(config: &AuthConfig) -> Result<(), AuthError> {
    if config.is_dev() {
        Ok(())
    } else {
        debug!(platform = %config.platform, "admin operation outside dev");
        Err(AuthError::Forbidden(
            "admin operations are only available in dev".into(),
        ))
    }
}
