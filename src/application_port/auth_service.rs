use crate::domain_model::{AdminUser, AdminUserId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("all input is required: missing {0}")]
    MissingInput(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email already registered")]
    EmailTaken,
    #[error("username already taken")]
    UsernameTaken,
    #[error("user not found")]
    UserNotFound,
    #[error("token invalid")]
    TokenInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("photo error: {0}")]
    Photo(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub username: String,
    pub password: String,
    pub job_role: String,
    pub user_type: String,
    pub photo: Option<PhotoUpload>,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub access_token: AccessToken,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RegisterResult {
    pub user_id: AdminUserId,
    pub token: IssuedToken,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: AdminUser,
    pub token: IssuedToken,
}

#[derive(Debug, Clone)]
pub struct TokenVerifyResult {
    pub user_id: AdminUserId,
    pub username: String,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn issue_access_token(
        &self,
        user: AdminUserId,
        username: &str,
        jti: &str,
        ttl: Duration,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError>;
    async fn verify_access_token(&self, token: &AccessToken)
    -> Result<TokenVerifyResult, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn register(&self, request: RegisterInput) -> Result<RegisterResult, AuthError>;
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError>;
    async fn verify_token(&self, token: &str) -> Result<AdminUserId, AuthError>;
    async fn logout(&self, token: &str) -> Result<(), AuthError>;
}
