//! Trust material extraction from `Authorization` headers.

use http::HeaderMap;
use http::header::AUTHORIZATION;

use super::AuthError;

/// Scheme prefix for access and refresh tokens.
const BEARER_PREFIX: &str = "Bearer ";

/// Scheme prefix for webhook API keys.
const API_KEY_PREFIX: &str = "ApiKey ";

/// Extract the token from `Authorization: Bearer <token>`.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    extract_scheme(headers, BEARER_PREFIX)
}

/// Extract the key from `Authorization: ApiKey <key>`.
pub fn extract_api_key(headers: &HeaderMap) -> Result<&str, AuthError> {
    extract_scheme(headers, API_KEY_PREFIX)
}

/// The scheme is case-sensitive and separated from the credential by exactly
/// one space; the credential must be non-empty and contain no whitespace.
fn extract_scheme<'a>(headers: &'a HeaderMap, prefix: &str) -> Result<&'a str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::HeaderMissing)?
        .to_str()
        .map_err(|_| AuthError::HeaderMalformed)?;

    let credential = value
        .strip_prefix(prefix)
        .ok_or(AuthError::HeaderMalformed)?;

    if credential.is_empty() || credential.contains(char::is_whitespace) {
        return Err(AuthError::HeaderMalformed);
    }
    Ok(credential)
}
