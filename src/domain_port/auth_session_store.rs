use crate::application_port::*;
use crate::domain_model::*;

/// Live bearer sessions keyed by token id (`jti`).
#[async_trait::async_trait]
pub trait AuthSessionStore: Send + Sync {
    /// Record a freshly issued token id for a user with TTL.
    async fn save(&self, jti: &str, user_id: AdminUserId, ttl_secs: u64)
    -> Result<(), AuthError>;
    /// The owning user if the token id is live; expired and revoked ids yield `None`.
    async fn lookup(&self, jti: &str) -> Result<Option<AdminUserId>, AuthError>;
    /// Returns whether a live session was removed.
    async fn revoke(&self, jti: &str) -> Result<bool, AuthError>;
}
