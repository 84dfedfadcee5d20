use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Per-room ledger of reserved display names. At most one live
/// reservation per (room, normalized name).
#[async_trait]
pub trait ReservationLedger: Send + Sync {
    /// Atomically reserve the name unless a live reservation exists.
    /// An expired reservation counts as free.
    async fn try_reserve(
        &self,
        room_id: &str,
        name: &str,
        expires_at_ms: i64,
        now_ms: i64,
    ) -> LedgerResult<bool>;

    async fn release(&self, room_id: &str, name: &str) -> LedgerResult<()>;

    /// Reap reservations whose expiry has passed; returns how many were
    /// removed.
    async fn cleanup_expired(&self, room_id: &str, now_ms: i64) -> LedgerResult<u64>;
}

/// Reserve-unless-live, one round trip.
const RESERVE_SCRIPT: &str = r#"
local existing = redis.call("HGET", KEYS[1], ARGV[1])
if existing and tonumber(existing) > tonumber(ARGV[3]) then
    return 0
end
redis.call("HSET", KEYS[1], ARGV[1], ARGV[2])
return 1
"#;

const CLEANUP_SCRIPT: &str = r#"
local fields = redis.call("HGETALL", KEYS[1])
local removed = 0
for i = 1, #fields, 2 do
    if tonumber(fields[i + 1]) <= tonumber(ARGV[1]) then
        redis.call("HDEL", KEYS[1], fields[i])
        removed = removed + 1
    end
end
return removed
"#;

pub struct RedisReservationLedger {
    conn: ConnectionManager,
}

impl RedisReservationLedger {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(room_id: &str) -> String {
        format!("meethub:names:{room_id}")
    }
}

#[async_trait]
impl ReservationLedger for RedisReservationLedger {
    async fn try_reserve(
        &self,
        room_id: &str,
        name: &str,
        expires_at_ms: i64,
        now_ms: i64,
    ) -> LedgerResult<bool> {
        let mut conn = self.conn.clone();
        let reserved: i64 = redis::Script::new(RESERVE_SCRIPT)
            .key(Self::key(room_id))
            .arg(name)
            .arg(expires_at_ms)
            .arg(now_ms)
            .invoke_async(&mut conn)
            .await?;
        Ok(reserved == 1)
    }

    async fn release(&self, room_id: &str, name: &str) -> LedgerResult<()> {
        let mut conn = self.conn.clone();
        redis::cmd("HDEL")
            .arg(Self::key(room_id))
            .arg(name)
            .query_async::<()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn cleanup_expired(&self, room_id: &str, now_ms: i64) -> LedgerResult<u64> {
        let mut conn = self.conn.clone();
        let removed: i64 = redis::Script::new(CLEANUP_SCRIPT)
            .key(Self::key(room_id))
            .arg(now_ms)
            .invoke_async(&mut conn)
            .await?;
        Ok(removed.max(0) as u64)
    }
}

#[derive(Debug, Error)]
pub enum NameError {
    #[error("Participant name is empty")]
    EmptyName,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Reservation keys are case-insensitive; the returned display name
/// keeps the caller's casing.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Guarantees unique display names within a room by suffixing `_1`,
/// `_2`, ... on conflict.
pub struct ParticipantNameService {
    ledger: Arc<dyn ReservationLedger>,
    ttl_ms: i64,
}

impl ParticipantNameService {
    pub fn new(ledger: Arc<dyn ReservationLedger>, ttl_ms: i64) -> Self {
        Self { ledger, ttl_ms }
    }

    pub async fn reserve(&self, room_id: &str, requested: &str) -> Result<String, NameError> {
        let base = requested.trim();
        if base.is_empty() {
            return Err(NameError::EmptyName);
        }

        let now_ms = Utc::now().timestamp_millis();
        let expires_at_ms = now_ms + self.ttl_ms;
        let mut suffix = 0u32;
        loop {
            let candidate = if suffix == 0 {
                base.to_string()
            } else {
                format!("{base}_{suffix}")
            };
            if self
                .ledger
                .try_reserve(room_id, &normalize_name(&candidate), expires_at_ms, now_ms)
                .await?
            {
                if suffix > 0 {
                    debug!(room_id, requested = base, reserved = %candidate, "Name conflict resolved with suffix");
                }
                return Ok(candidate);
            }
            suffix += 1;
        }
    }

    /// Best effort: a failed release must never block a participant's
    /// disconnect flow.
    pub async fn release(&self, room_id: &str, name: &str) {
        if let Err(e) = self.ledger.release(room_id, &normalize_name(name)).await {
            warn!(room_id, name, error = %e, "Name reservation release failed");
        }
    }

    pub async fn cleanup_expired(&self, room_id: &str) -> Result<u64, NameError> {
        let removed = self
            .ledger
            .cleanup_expired(room_id, Utc::now().timestamp_millis())
            .await?;
        if removed > 0 {
            debug!(room_id, removed, "Expired name reservations reaped");
        }
        Ok(removed)
    }
}
