use chrono::Utc;
use meethub_db::models::{Recording, RecordingStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::lock::DistributedLock;
use crate::media::MediaServer;
use crate::store::RecordingStore;

use super::GcError;

/// Lock name shared by every instance running this sweep.
const LOCK_NAME: &str = "gc:recordings";

#[derive(Debug, Clone)]
pub struct RecordingGcConfig {
    pub interval: Duration,
    /// Heartbeat gap beyond which a recording is considered stale. The
    /// boundary itself is still fresh.
    pub grace_ms: i64,
    pub lock_ttl: Duration,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RecordingSweepStats {
    pub examined: usize,
    pub fresh: usize,
    /// Stale heartbeat, but the meeting is still live.
    pub kept_stale: usize,
    pub aborted_no_egress: usize,
    pub aborted_orphaned: usize,
    pub errors: usize,
}

enum Reconciled {
    Fresh,
    KeptStale,
    AbortedNoEgress,
    AbortedOrphaned,
}

/// Background sweep reconciling active-like recording records against
/// the media server's live egress state.
pub struct RecordingStaleGc {
    recordings: Arc<dyn RecordingStore>,
    media: Arc<dyn MediaServer>,
    lock: Arc<dyn DistributedLock>,
    config: RecordingGcConfig,
}

impl RecordingStaleGc {
    pub fn new(
        recordings: Arc<dyn RecordingStore>,
        media: Arc<dyn MediaServer>,
        lock: Arc<dyn DistributedLock>,
        config: RecordingGcConfig,
    ) -> Self {
        Self {
            recordings,
            media,
            lock,
            config,
        }
    }

    /// Run the sweep on its interval until cancelled.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            grace_ms = self.config.grace_ms,
            "Starting stale-recording sweep"
        );
        let mut interval = tokio::time::interval(self.config.interval);
        loop {
            tokio::select! {
                _ = interval.tick() => self.cycle().await,
                _ = cancel.cancelled() => {
                    info!("Stale-recording sweep stopped");
                    break;
                }
            }
        }
    }

    /// One lock-guarded cycle. Failing to acquire the lock is the
    /// expected signal that another instance is sweeping; skip quietly.
    async fn cycle(&self) {
        let token = match self.lock.acquire(LOCK_NAME, self.config.lock_ttl).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("Another instance holds the recording sweep lock, skipping cycle");
                return;
            }
            Err(e) => {
                error!(error = %e, "Recording sweep lock acquisition failed");
                return;
            }
        };

        let result = self.sweep().await;

        if let Err(e) = self.lock.release(LOCK_NAME, &token).await {
            warn!(error = %e, "Recording sweep lock release failed, TTL will expire it");
        }

        match result {
            Ok(stats) => {
                if stats.aborted_no_egress + stats.aborted_orphaned + stats.errors > 0 {
                    info!(?stats, "Stale-recording sweep finished");
                }
            }
            Err(e) => error!(error = %e, "Stale-recording sweep abandoned"),
        }
    }

    pub async fn sweep(&self) -> Result<RecordingSweepStats, GcError> {
        self.sweep_at(Utc::now().timestamp_millis()).await
    }

    /// Sweep against an explicit clock, which pins heartbeat-gap
    /// comparisons exactly.
    pub async fn sweep_at(&self, now_ms: i64) -> Result<RecordingSweepStats, GcError> {
        let candidates = self.recordings.list_active().await?;

        let mut stats = RecordingSweepStats {
            examined: candidates.len(),
            ..Default::default()
        };
        for recording in &candidates {
            match self.reconcile(recording, now_ms).await {
                Ok(Reconciled::Fresh) => stats.fresh += 1,
                Ok(Reconciled::KeptStale) => stats.kept_stale += 1,
                Ok(Reconciled::AbortedNoEgress) => stats.aborted_no_egress += 1,
                Ok(Reconciled::AbortedOrphaned) => stats.aborted_orphaned += 1,
                Err(e) => {
                    warn!(
                        recording_id = %recording.recording_id,
                        error = %e,
                        "Recording reconciliation failed, continuing sweep"
                    );
                    stats.errors += 1;
                }
            }
        }
        Ok(stats)
    }

    async fn reconcile(&self, recording: &Recording, now_ms: i64) -> Result<Reconciled, GcError> {
        let egresses = self.media.list_egresses(&recording.room_id).await?;
        let Some(egress) = egresses
            .into_iter()
            .find(|e| e.egress_id == recording.recording_id.egress_id)
        else {
            // The egress process vanished entirely; nothing left to stop.
            self.recordings
                .update_status(&recording.recording_id, RecordingStatus::Aborted)
                .await?;
            warn!(
                recording_id = %recording.recording_id,
                "No matching egress, recording aborted"
            );
            return Ok(Reconciled::AbortedNoEgress);
        };

        let gap = now_ms - egress.updated_at_ms;
        // A heartbeat exactly at the grace boundary, or in the future
        // (clock skew), is still fresh.
        if gap <= self.config.grace_ms {
            return Ok(Reconciled::Fresh);
        }

        let occupied = self.media.room_exists(&recording.room_id).await?
            && !self
                .media
                .list_participants(&recording.room_id)
                .await?
                .is_empty();
        if occupied {
            // The meeting is still live; a stale heartbeat alone is not
            // grounds for aborting.
            debug!(
                recording_id = %recording.recording_id,
                gap_ms = gap,
                "Stale heartbeat but room occupied, keeping recording"
            );
            return Ok(Reconciled::KeptStale);
        }

        self.media.stop_egress(&egress.egress_id).await?;
        self.recordings
            .update_status(&recording.recording_id, RecordingStatus::Aborted)
            .await?;
        warn!(
            recording_id = %recording.recording_id,
            gap_ms = gap,
            "Orphaned recording stopped and aborted"
        );
        Ok(Reconciled::AbortedOrphaned)
    }
}
