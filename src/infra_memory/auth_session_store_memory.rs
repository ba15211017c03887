use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

const MAX_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

struct SessionEntry {
    user_id: AdminUserId,
    expires_at: DateTime<Utc>,
}

/// Token-id to user mapping with expiry, held in process memory.
#[derive(Default)]
pub struct MemoryAuthSessionStore {
    sessions: DashMap<String, SessionEntry>,
}

impl MemoryAuthSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait::async_trait]
impl AuthSessionStore for MemoryAuthSessionStore {
    async fn save(
        &self,
        jti: &str,
        user_id: AdminUserId,
        ttl_secs: u64,
    ) -> Result<(), AuthError> {
        let ttl = i64::try_from(ttl_secs)
            .unwrap_or(MAX_TTL_SECS)
            .min(MAX_TTL_SECS);
        let now = Utc::now();
        self.sessions.retain(|_, entry| entry.expires_at > now);
        let expires_at = now + Duration::seconds(ttl);
        self.sessions.insert(
            jti.to_string(),
            SessionEntry {
                user_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn lookup(&self, jti: &str) -> Result<Option<AdminUserId>, AuthError> {
        let now = Utc::now();
        let expired = match self.sessions.get(jti) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.user_id)),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.sessions.remove_if(jti, |_, entry| entry.expires_at <= now);
        }
        Ok(None)
    }

    async fn revoke(&self, jti: &str) -> Result<bool, AuthError> {
        let now = Utc::now();
        Ok(self
            .sessions
            .remove(jti)
            .is_some_and(|(_, entry)| entry.expires_at > now))
    }
}
