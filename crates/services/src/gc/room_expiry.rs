use bson::DateTime;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::lifecycle::{DeletionOrchestrator, Disposition, LifecycleError};
use crate::lock::DistributedLock;
use crate::store::RoomStore;

use super::GcError;

const LOCK_NAME: &str = "gc:room-expiry";

#[derive(Debug, Clone)]
pub struct RoomExpiryGcConfig {
    pub interval: Duration,
    pub lock_ttl: Duration,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RoomExpirySweepStats {
    pub examined: usize,
    pub deleted: usize,
    pub closed: usize,
    pub scheduled: usize,
    /// The room's own policy refused immediate deletion; retried next
    /// sweep.
    pub rejected: usize,
    pub errors: usize,
}

/// Background sweep enforcing `auto_deletion_date` deadlines with each
/// room's own stored policy.
pub struct RoomExpiryGc {
    rooms: Arc<dyn RoomStore>,
    orchestrator: Arc<DeletionOrchestrator>,
    lock: Arc<dyn DistributedLock>,
    config: RoomExpiryGcConfig,
}

impl RoomExpiryGc {
    pub fn new(
        rooms: Arc<dyn RoomStore>,
        orchestrator: Arc<DeletionOrchestrator>,
        lock: Arc<dyn DistributedLock>,
        config: RoomExpiryGcConfig,
    ) -> Self {
        Self {
            rooms,
            orchestrator,
            lock,
            config,
        }
    }

    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            "Starting room-expiry sweep"
        );
        let mut interval = tokio::time::interval(self.config.interval);
        loop {
            tokio::select! {
                _ = interval.tick() => self.cycle().await,
                _ = cancel.cancelled() => {
                    info!("Room-expiry sweep stopped");
                    break;
                }
            }
        }
    }

    async fn cycle(&self) {
        let token = match self.lock.acquire(LOCK_NAME, self.config.lock_ttl).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("Another instance holds the room-expiry lock, skipping cycle");
                return;
            }
            Err(e) => {
                error!(error = %e, "Room-expiry lock acquisition failed");
                return;
            }
        };

        let result = self.sweep().await;

        if let Err(e) = self.lock.release(LOCK_NAME, &token).await {
            warn!(error = %e, "Room-expiry lock release failed, TTL will expire it");
        }

        match result {
            Ok(stats) => {
                if stats.examined > 0 {
                    info!(?stats, "Room-expiry sweep finished");
                }
            }
            Err(e) => error!(error = %e, "Room-expiry sweep abandoned"),
        }
    }

    pub async fn sweep(&self) -> Result<RoomExpirySweepStats, GcError> {
        let expired = self.rooms.list_expired(DateTime::now()).await?;

        let mut stats = RoomExpirySweepStats {
            examined: expired.len(),
            ..Default::default()
        };
        for room in expired {
            // Each room is deleted under its own stored policy; this is
            // what resolves deferred commitments made at creation time.
            match self
                .orchestrator
                .delete_one(&room.room_id, room.auto_deletion_policy)
                .await
            {
                Ok(outcome) => {
                    info!(room_id = %room.room_id, code = %outcome.code, "Expired room processed");
                    match outcome.disposition {
                        Disposition::Deleted => stats.deleted += 1,
                        Disposition::Closed => stats.closed += 1,
                        Disposition::Scheduled => stats.scheduled += 1,
                    }
                }
                Err(LifecycleError::Rejected(code)) => {
                    warn!(room_id = %room.room_id, %code, "Expired room deletion rejected by its policy");
                    stats.rejected += 1;
                }
                Err(e) => {
                    warn!(room_id = %room.room_id, error = %e, "Expired room deletion failed, continuing sweep");
                    stats.errors += 1;
                }
            }
        }
        Ok(stats)
    }
}
