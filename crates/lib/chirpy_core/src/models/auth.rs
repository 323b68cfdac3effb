//! Authentication domain models.
//!
//! These are internal domain models, distinct from the JSON shapes the API
//! layer serializes for clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain user with its stored password hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    /// Upgraded ("Chirpy Red") membership flag.
    pub is_chirpy_red: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Refresh token record stored in the database.
///
/// The token itself is never stored; records are keyed by its SHA-256 digest.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// True iff the token has not been revoked and has not yet expired.
    pub fn is_usable(&self) -> bool {
        self.is_usable_at(Utc::now())
    }

    /// [`is_usable`](Self::is_usable) evaluated at a fixed instant.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }
}

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer, always `chirpy-access`.
    pub iss: String,
    /// Subject: user ID (standard JWT `sub` claim).
    pub sub: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}
