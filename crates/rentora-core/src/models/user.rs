//! User model
//!
//! A user is either a renter booking properties or an owner listing them.
//! Authentication happens outside the core; callers hand over a resolved
//! username.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,

    /// Username (unique, resolved by the identity layer)
    pub username: String,

    /// Email address
    pub email: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user record, not yet persisted
    pub fn new(username: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: 0,
            username: username.into(),
            email,
            created_at: Utc::now(),
        }
    }
}
