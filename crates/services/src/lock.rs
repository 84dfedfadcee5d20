use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

pub type LockResult<T> = Result<T, LockError>;

/// Proof of acquisition; release is a no-op unless the lock still holds
/// this exact token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken(String);

impl LockToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Named distributed mutex with TTL. Acquisition never blocks: `None`
/// means another instance holds the lock and the caller should skip its
/// cycle.
#[async_trait]
pub trait DistributedLock: Send + Sync {
    async fn acquire(&self, name: &str, ttl: Duration) -> LockResult<Option<LockToken>>;

    async fn release(&self, name: &str, token: &LockToken) -> LockResult<()>;
}

/// Compare-and-delete so a lock that expired and was re-acquired by
/// another instance is never released from here.
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

pub struct RedisLock {
    conn: ConnectionManager,
}

impl RedisLock {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(name: &str) -> String {
        format!("meethub:lock:{name}")
    }
}

#[async_trait]
impl DistributedLock for RedisLock {
    async fn acquire(&self, name: &str, ttl: Duration) -> LockResult<Option<LockToken>> {
        let token = Uuid::new_v4().simple().to_string();
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(Self::key(name))
            .arg(&token)
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis() as u64)
            .query_async(&mut conn)
            .await?;

        Ok(reply.map(|_| LockToken(token)))
    }

    async fn release(&self, name: &str, token: &LockToken) -> LockResult<()> {
        let mut conn = self.conn.clone();
        redis::Script::new(RELEASE_SCRIPT)
            .key(Self::key(name))
            .arg(&token.0)
            .invoke_async::<i64>(&mut conn)
            .await?;
        Ok(())
    }
}
