//! PostgreSQL storage backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ChirpStore, RefreshTokenStore, StoreError, UserStore};
use crate::models::auth::{RefreshTokenRecord, User};
use crate::models::chirp::{Chirp, SortOrder};
use crate::uuid::uuidv7;

type UserRow = (Uuid, String, String, bool, DateTime<Utc>, DateTime<Utc>);
type ChirpRow = (Uuid, String, Uuid, DateTime<Utc>, DateTime<Utc>);
type RefreshRow = (
    Uuid,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
    DateTime<Utc>,
    DateTime<Utc>,
);

const USER_COLUMNS: &str = "id, email, hashed_password, is_chirpy_red, created_at, updated_at";
const CHIRP_COLUMNS: &str = "id, body, user_id, created_at, updated_at";

/// sqlx-backed store over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn user_from_row(
    (id, email, password_hash, is_chirpy_red, created_at, updated_at): UserRow,
) -> User {
    User {
        id,
        email,
        password_hash,
        is_chirpy_red,
        created_at,
        updated_at,
    }
}

fn chirp_from_row((id, body, user_id, created_at, updated_at): ChirpRow) -> Chirp {
    Chirp {
        id,
        body,
        user_id,
        created_at,
        updated_at,
    }
}

fn refresh_from_row(
    (user_id, expires_at, revoked_at, created_at, updated_at): RefreshRow,
) -> RefreshTokenRecord {
    RefreshTokenRecord {
        user_id,
        expires_at,
        revoked_at,
        created_at,
        updated_at,
    }
}

/// Translate unique-constraint violations into `Conflict`.
fn conflict_or(e: sqlx::Error, what: &str) -> StoreError {
    let unique = e
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if unique {
        StoreError::Conflict(what.to_string())
    } else {
        StoreError::Database(e)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (email, hashed_password) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or(e, "email already registered"))?;
        Ok(user_from_row(row))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(user_from_row))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(user_from_row))
    }

    async fn update_user_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET email = $2, hashed_password = $3, updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| conflict_or(e, "email already registered"))?;
        let Some(row) = row else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = now(), updated_at = now() \
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(user_from_row(row)))
    }

    async fn upgrade_user_to_red(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET is_chirpy_red = true, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_users(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM users")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ChirpStore for PgStore {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, StoreError> {
        let row = sqlx::query_as::<_, ChirpRow>(&format!(
            "INSERT INTO chirps (id, body, user_id) VALUES ($1, $2, $3) RETURNING {CHIRP_COLUMNS}"
        ))
        .bind(uuidv7())
        .bind(body)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(chirp_from_row(row))
    }

    async fn list_chirps(
        &self,
        author: Option<Uuid>,
        sort: SortOrder,
    ) -> Result<Vec<Chirp>, StoreError> {
        let direction = match sort {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        // $1 IS NULL lets one statement serve both the filtered and full listing.
        let rows = sqlx::query_as::<_, ChirpRow>(&format!(
            "SELECT {CHIRP_COLUMNS} FROM chirps \
             WHERE ($1::uuid IS NULL OR user_id = $1) \
             ORDER BY created_at {direction}, id {direction}"
        ))
        .bind(author)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(chirp_from_row).collect())
    }

    async fn find_chirp(&self, id: Uuid) -> Result<Option<Chirp>, StoreError> {
        let row = sqlx::query_as::<_, ChirpRow>(&format!(
            "SELECT {CHIRP_COLUMNS} FROM chirps WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(chirp_from_row))
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RefreshTokenStore for PgStore {
    async fn insert_refresh_token(
        &self,
        token_hash: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO refresh_tokens (token_hash, user_id, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(token_hash)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or(e, "refresh token already exists"))?;
        Ok(())
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let row = sqlx::query_as::<_, RefreshRow>(
            "SELECT user_id, expires_at, revoked_at, created_at, updated_at \
             FROM refresh_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(refresh_from_row))
    }

    async fn claim_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        // The row lock serializes racing claims; the loser re-evaluates the
        // WHERE clause against the revoked row and matches nothing.
        let row = sqlx::query_as::<_, RefreshRow>(
            "UPDATE refresh_tokens \
             SET revoked_at = now(), updated_at = now() \
             WHERE token_hash = $1 AND revoked_at IS NULL AND expires_at > now() \
             RETURNING user_id, expires_at, NULL::timestamptz, created_at, updated_at",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(refresh_from_row))
    }

    async fn revoke_refresh_token(&self, token_hash: &str) -> Result<bool, StoreError> {
        // COALESCE keeps the first revocation time; the row lock makes
        // concurrent revokes of one token serialize and both succeed.
        let row = sqlx::query_scalar::<_, String>(
            "UPDATE refresh_tokens \
             SET revoked_at = COALESCE(revoked_at, now()), updated_at = now() \
             WHERE token_hash = $1 \
             RETURNING token_hash",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn revoke_user_refresh_tokens(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = now(), updated_at = now() \
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
