//! Storage contracts consumed by the auth subsystem and the API handlers.
//!
//! Two backends implement every trait: [`PgStore`] over a sqlx PostgreSQL
//! pool, and [`MemoryStore`] for tests and database-less runs.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::auth::{RefreshTokenRecord, User};
use crate::models::chirp::{Chirp, SortOrder};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// User records. The auth subsystem reads password hashes and the
/// privilege flag; writes go through here on its behalf.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Fails with `Conflict` if the email is taken.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Replace email and password hash and revoke every refresh token the
    /// user holds, as one atomic change. `None` if the user does not exist.
    async fn update_user_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Set the upgraded flag. Returns whether the user exists.
    async fn upgrade_user_to_red(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Delete every user along with their chirps and refresh tokens.
    async fn delete_all_users(&self) -> Result<u64, StoreError>;
}

/// Chirp records.
#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, StoreError>;

    /// List chirps ordered by creation time, optionally for one author only.
    async fn list_chirps(
        &self,
        author: Option<Uuid>,
        sort: SortOrder,
    ) -> Result<Vec<Chirp>, StoreError>;

    async fn find_chirp(&self, id: Uuid) -> Result<Option<Chirp>, StoreError>;

    /// Returns whether a chirp was deleted.
    async fn delete_chirp(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Refresh token rows keyed by token digest.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Insert a new, unrevoked token. Fails with `Conflict` on a duplicate digest.
    async fn insert_refresh_token(
        &self,
        token_hash: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Set `revoked_at` if it is unset. Returns whether the token exists,
    /// so revoking an already revoked token still returns `true`.
    async fn revoke_refresh_token(&self, token_hash: &str) -> Result<bool, StoreError>;

    /// Atomically revoke a token that is still usable and return its record
    /// with `revoked_at` unset. `None` if the token is unknown, revoked or
    /// expired. Of several concurrent claims on one token, at most one wins.
    async fn claim_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Revoke every unrevoked token of a user. Returns how many changed.
    async fn revoke_user_refresh_tokens(&self, user_id: Uuid) -> Result<u64, StoreError>;
}

/// Everything the API needs from a single backend.
pub trait Store: UserStore + ChirpStore + RefreshTokenStore {}

impl<T: UserStore + ChirpStore + RefreshTokenStore> Store for T {}
