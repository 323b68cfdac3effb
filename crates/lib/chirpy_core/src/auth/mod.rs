//! Authentication and authorization logic.
//!
//! Password hashing, access token issue/validation, refresh token lifecycle,
//! transport header parsing, and the request-level authorization policies
//! that are shared by every `chirpy_api` handler.

pub mod extract;
pub mod jwt;
pub mod password;
pub mod policy;
pub mod refresh;

use thiserror::Error;

use crate::store::StoreError;

/// Authentication and authorization errors.
///
/// Header and token variants are kept distinct for diagnostics; the API
/// boundary collapses them into a single unauthenticated response.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header missing")]
    HeaderMissing,

    #[error("Authorization header malformed")]
    HeaderMalformed,

    #[error("Token invalid")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// True for failures that mean "the caller could not be authenticated".
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            AuthError::HeaderMissing
                | AuthError::HeaderMalformed
                | AuthError::TokenInvalid
                | AuthError::TokenExpired
                | AuthError::Unauthorized
        )
    }
}
