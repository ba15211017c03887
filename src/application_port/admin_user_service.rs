use crate::domain_model::{AdminUser, AdminUserId};

#[derive(Debug, thiserror::Error)]
pub enum AdminUserError {
    #[error("all input is required: missing {0}")]
    MissingInput(String),
    #[error("email already registered")]
    EmailTaken,
    #[error("username already taken")]
    UsernameTaken,
    #[error("user not found")]
    NotFound,
    #[error("caller is not a known user")]
    Unauthenticated,
    #[error("caller may not modify user {0}")]
    Forbidden(AdminUserId),
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

/// Replacement profile for an existing user.
///
/// `password` is optional: when absent, or when it matches the stored hash,
/// the stored hash is kept untouched.
#[derive(Debug, Clone)]
pub struct UpdateAdminUserInput {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub username: String,
    pub password: Option<String>,
    pub job_role: String,
    pub user_type: String,
}

#[async_trait::async_trait]
pub trait AdminUserService: Send + Sync {
    async fn list(&self) -> Result<Vec<AdminUser>, AdminUserError>;
    async fn update(
        &self,
        caller: AdminUserId,
        target: AdminUserId,
        request: UpdateAdminUserInput,
    ) -> Result<AdminUser, AdminUserError>;
    async fn delete(&self, caller: AdminUserId, target: AdminUserId)
    -> Result<(), AdminUserError>;
}
