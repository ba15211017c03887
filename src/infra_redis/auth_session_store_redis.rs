use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use redis::aio::ConnectionManager;
use redis::{
    AsyncCommands, FromRedisValue, RedisError, RedisResult, RedisWrite, ToRedisArgs, Value,
};

/// Sessions as `<prefix>:<jti> -> user id` keys expiring with the token.
pub struct RedisAuthSessionStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisAuthSessionStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisAuthSessionStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, jti: &str) -> String {
        format!("{}:{}", self.prefix, jti)
    }
}

impl ToRedisArgs for AdminUserId {
    fn write_redis_args<W>(&self, out: &mut W)
    where
        W: ?Sized + RedisWrite,
    {
        out.write_arg(self.to_string().as_bytes())
    }
}

impl FromRedisValue for AdminUserId {
    fn from_redis_value(v: &Value) -> RedisResult<Self> {
        let s: String = redis::from_redis_value(v)?;
        let user_id = s.parse::<AdminUserId>().map_err(|e| {
            RedisError::from((
                redis::ErrorKind::TypeError,
                "invalid AdminUserId string",
                e.to_string(),
            ))
        })?;
        Ok(user_id)
    }
}

#[async_trait::async_trait]
impl AuthSessionStore for RedisAuthSessionStore {
    async fn save(
        &self,
        jti: &str,
        user_id: AdminUserId,
        ttl_secs: u64,
    ) -> Result<(), AuthError> {
        let key = self.key(jti);
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&key, &user_id, ttl_secs.max(1))
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(())
    }

    async fn lookup(&self, jti: &str) -> Result<Option<AdminUserId>, AuthError> {
        let key = self.key(jti);
        let mut conn = self.conn.clone();
        let val: Option<AdminUserId> = conn
            .get(&key)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(val)
    }

    async fn revoke(&self, jti: &str) -> Result<bool, AuthError> {
        let key = self.key(jti);
        let mut conn = self.conn.clone();
        let removed: u64 = conn
            .del(&key)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(removed > 0)
    }
}
