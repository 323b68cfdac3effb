//! Chirp domain model.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A short post. `user_id` is the owner checked by the ownership policy.
#[derive(Debug, Clone)]
pub struct Chirp {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ordering for chirp listings, by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a `sort` query value. Anything other than `desc` sorts ascending.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}
