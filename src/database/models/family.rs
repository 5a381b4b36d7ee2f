use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::{FamilyId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Family {
    pub id: FamilyId,
    pub name: String,
    /// Shared secret for joining; never leaves the server
    #[serde(skip_serializing, default)]
    pub join_password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFamily {
    pub name: String,
    pub join_password: String,
}

/// Membership edge as stored in `family_users`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FamilyUser {
    pub user_id: UserId,
    pub family_id: FamilyId,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Membership edge joined with the member's username, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FamilyMember {
    pub user_id: UserId,
    pub username: Option<String>,
    pub role: String,
}
