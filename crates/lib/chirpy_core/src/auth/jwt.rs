//! JWT access token generation and verification.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::TokenClaims;

/// Issuer claim stamped on, and required of, every access token.
pub const ACCESS_TOKEN_ISSUER: &str = "chirpy-access";

/// Access token lifetime: 1 hour.
pub const ACCESS_TOKEN_EXPIRY_SECS: i64 = 60 * 60;

/// Generate a signed JWT access token (HS256, 1 hour expiry).
pub fn issue_access_token(user_id: Uuid, secret: &[u8]) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = TokenClaims {
        iss: ACCESS_TOKEN_ISSUER.to_string(),
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS)).timestamp(),
    };
    sign_claims(&claims, secret)
}

/// Verify a JWT access token, returning the subject user ID on success.
///
/// A bad signature, malformed token, wrong issuer, or non-UUID subject is
/// `TokenInvalid`; an elapsed `exp` is `TokenExpired`.
pub fn validate_access_token(token: &str, secret: &[u8]) -> Result<Uuid, AuthError> {
    let key = DecodingKey::from_secret(secret);
    let data = decode::<TokenClaims>(token, &key, &validation()).map_err(|e| {
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        }
    })?;
    Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::TokenInvalid)
}

fn sign_claims(claims: &TokenClaims, secret: &[u8]) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.set_issuer(&[ACCESS_TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation
}
