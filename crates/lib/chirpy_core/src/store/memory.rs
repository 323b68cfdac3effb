//! In-memory storage backend.
//!
//! Used by tests and by servers started without a database URL. State lives
//! only as long as the process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use super::{ChirpStore, RefreshTokenStore, StoreError, UserStore};
use crate::models::auth::{RefreshTokenRecord, User};
use crate::models::chirp::{Chirp, SortOrder};
use crate::uuid::uuidv7;

/// Concurrent maps standing in for the relational tables.
///
/// Never hold a guard on one map while locking another.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    emails: DashMap<String, Uuid>,
    chirps: DashMap<Uuid, Chirp>,
    refresh_tokens: DashMap<String, RefreshTokenRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn revoke_tokens_of(&self, user_id: Uuid) -> u64 {
        let now = Utc::now();
        let mut count = 0;
        for mut rec in self.refresh_tokens.iter_mut() {
            if rec.user_id == user_id && rec.revoked_at.is_none() {
                rec.revoked_at = Some(now);
                rec.updated_at = now;
                count += 1;
            }
        }
        count
    }

    /// Claim `email` for `id`. Succeeds if it is free or already owned by `id`.
    fn reserve_email(&self, email: &str, id: Uuid) -> Result<(), StoreError> {
        match self.emails.entry(email.to_string()) {
            Entry::Occupied(owner) if *owner.get() != id => {
                Err(StoreError::Conflict("email already registered".into()))
            }
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let id = Uuid::new_v4();
        self.reserve_email(email, id)?;
        let now = Utc::now();
        let user = User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_chirpy_red: false,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let Some(id) = self.emails.get(email).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|user| user.value().clone()))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).map(|user| user.value().clone()))
    }

    async fn update_user_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>, StoreError> {
        if !self.users.contains_key(&id) {
            return Ok(None);
        }
        self.reserve_email(email, id)?;

        let updated = self.users.get_mut(&id).map(|mut user| {
            let old_email = std::mem::replace(&mut user.email, email.to_string());
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
            (old_email, user.clone())
        });

        match updated {
            Some((old_email, user)) => {
                if old_email != email {
                    self.emails.remove_if(&old_email, |_, owner| *owner == id);
                }
                self.revoke_tokens_of(id);
                Ok(Some(user))
            }
            None => {
                // User vanished between the check and the update.
                self.emails.remove_if(email, |_, owner| *owner == id);
                Ok(None)
            }
        }
    }

    async fn upgrade_user_to_red(&self, id: Uuid) -> Result<bool, StoreError> {
        match self.users.get_mut(&id) {
            Some(mut user) => {
                user.is_chirpy_red = true;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all_users(&self) -> Result<u64, StoreError> {
        let count = self.users.len() as u64;
        self.users.clear();
        self.emails.clear();
        self.chirps.clear();
        self.refresh_tokens.clear();
        Ok(count)
    }
}

#[async_trait]
impl ChirpStore for MemoryStore {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, StoreError> {
        let now = Utc::now();
        let chirp = Chirp {
            id: uuidv7(),
            body: body.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        self.chirps.insert(chirp.id, chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(
        &self,
        author: Option<Uuid>,
        sort: SortOrder,
    ) -> Result<Vec<Chirp>, StoreError> {
        let mut chirps: Vec<Chirp> = self
            .chirps
            .iter()
            .filter(|entry| author.is_none_or(|a| entry.user_id == a))
            .map(|entry| entry.value().clone())
            .collect();
        chirps.sort_by_key(|c| (c.created_at, c.id));
        if sort == SortOrder::Desc {
            chirps.reverse();
        }
        Ok(chirps)
    }

    async fn find_chirp(&self, id: Uuid) -> Result<Option<Chirp>, StoreError> {
        Ok(self.chirps.get(&id).map(|chirp| chirp.value().clone()))
    }

    async fn delete_chirp(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.chirps.remove(&id).is_some())
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryStore {
    async fn insert_refresh_token(
        &self,
        token_hash: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        match self.refresh_tokens.entry(token_hash.to_string()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(
                "refresh token already exists".into(),
            )),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                slot.insert(RefreshTokenRecord {
                    user_id,
                    expires_at,
                    revoked_at: None,
                    created_at: now,
                    updated_at: now,
                });
                Ok(())
            }
        }
    }

    async fn find_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        Ok(self.refresh_tokens.get(token_hash).map(|rec| rec.value().clone()))
    }

    async fn revoke_refresh_token(&self, token_hash: &str) -> Result<bool, StoreError> {
        match self.refresh_tokens.get_mut(token_hash) {
            Some(mut rec) => {
                let now = Utc::now();
                rec.revoked_at.get_or_insert(now);
                rec.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn claim_refresh_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        let Some(mut rec) = self.refresh_tokens.get_mut(token_hash) else {
            return Ok(None);
        };
        let now = Utc::now();
        if !rec.is_usable_at(now) {
            return Ok(None);
        }
        let claimed = rec.value().clone();
        rec.revoked_at = Some(now);
        rec.updated_at = now;
        Ok(Some(claimed))
    }

    async fn revoke_user_refresh_tokens(&self, user_id: Uuid) -> Result<u64, StoreError> {
        Ok(self.revoke_tokens_of(user_id))
    }
}
