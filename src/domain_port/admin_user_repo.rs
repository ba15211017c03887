use crate::domain_model::*;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Email => f.write_str("email"),
            UniqueField::Username => f.write_str("username"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("{0} already exists")]
    Duplicate(UniqueField),
    #[error("store error: {0}")]
    Store(String),
}

#[async_trait::async_trait]
pub trait AdminUserRepo: Send + Sync {
    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<AdminUser>, RepoError>;

    async fn get(&self, user_id: AdminUserId) -> Result<Option<AdminUser>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>, RepoError>;

    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, RepoError>;

    /// Fails with `Duplicate` when the email or username is already stored.
    async fn insert(&self, user: &AdminUser) -> Result<(), RepoError>;

    /// Replaces the stored record with the same id. Returns `false` when no
    /// such record exists.
    async fn update(&self, user: &AdminUser) -> Result<bool, RepoError>;

    /// Returns `false` when no such record exists.
    async fn delete(&self, user_id: AdminUserId) -> Result<bool, RepoError>;
}
