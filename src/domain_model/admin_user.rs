use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct AdminUserId(pub uuid::Uuid);

impl AdminUserId {
    pub fn new() -> Self {
        AdminUserId(uuid::Uuid::new_v4())
    }
}

impl Default for AdminUserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AdminUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AdminUserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(AdminUserId)
    }
}

/// `userType` values allowed to modify records other than their own.
const ADMINISTRATOR_TYPES: [&str; 2] = ["admin", "super_admin"];

/// A back-office operator account.
///
/// `password_hash` is always a PHC string produced by the credential hasher;
/// the plaintext never reaches this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub username: String,
    pub password_hash: String,
    pub job_role: String,
    pub user_type: String,
    pub photo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminUser {
    pub fn is_administrator(&self) -> bool {
        let normalized = self
            .user_type
            .trim()
            .to_lowercase()
            .replace([' ', '-'], "_");
        ADMINISTRATOR_TYPES.contains(&normalized.as_str())
    }

    /// Whether this user may update or delete the record identified by `target`.
    pub fn may_modify(&self, target: AdminUserId) -> bool {
        self.id == target || self.is_administrator()
    }
}

/// Emails are compared and stored lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
