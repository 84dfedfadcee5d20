use bson::DateTime;
use meethub_db::models::{DeletionPolicy, PendingAction, Room, RoomStatus};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::media::{MediaError, MediaServer};
use crate::store::{RecordingStore, RoomStore, StoreError};

use super::codes::{DeletionErrorCode, DeletionSuccessCode};
use super::resolver::{MeetingFacts, Resolution, resolve};
use super::sanitize::sanitize_room_id;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Room id is empty after sanitization: {0:?}")]
    InvalidRoomId(String),
    #[error("No valid room ids in bulk deletion request")]
    EmptyBulkRequest,
    #[error("{0}")]
    Rejected(DeletionErrorCode),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Media(#[from] MediaError),
}

/// How the room record ended up: gone, closed in place, or pending a
/// deferred action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Deleted,
    Closed,
    Scheduled,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletionOutcome {
    pub code: DeletionSuccessCode,
    pub disposition: Disposition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<Room>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkSuccess {
    pub room_id: String,
    pub success_code: DeletionSuccessCode,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkFailure {
    pub room_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<DeletionErrorCode>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkDeletionReport {
    pub successful: Vec<BulkSuccess>,
    pub failed: Vec<BulkFailure>,
}

impl BulkDeletionReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// What `handle_meeting_ended` did with the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingEndOutcome {
    RoomGone,
    Deleted { purged_recordings: u64 },
    Closed,
    Reopened,
}

/// Executes resolver decisions against the stores and the media server.
pub struct DeletionOrchestrator {
    rooms: Arc<dyn RoomStore>,
    recordings: Arc<dyn RecordingStore>,
    media: Arc<dyn MediaServer>,
}

impl DeletionOrchestrator {
    pub fn new(
        rooms: Arc<dyn RoomStore>,
        recordings: Arc<dyn RecordingStore>,
        media: Arc<dyn MediaServer>,
    ) -> Self {
        Self {
            rooms,
            recordings,
            media,
        }
    }

    /// Delete a single room under the given policy. Deleting a room that
    /// does not exist is idempotent success, never an error.
    pub async fn delete_one(
        &self,
        raw_room_id: &str,
        policy: DeletionPolicy,
    ) -> Result<DeletionOutcome, LifecycleError> {
        let room_id = sanitize_room_id(raw_room_id);
        if room_id.is_empty() {
            return Err(LifecycleError::InvalidRoomId(raw_room_id.to_string()));
        }
        self.delete_sanitized(&room_id, policy).await
    }

    async fn delete_sanitized(
        &self,
        room_id: &str,
        policy: DeletionPolicy,
    ) -> Result<DeletionOutcome, LifecycleError> {
        let Some(mut room) = self.rooms.get(room_id).await? else {
            debug!(room_id, "Room already absent, treating delete as success");
            return Ok(DeletionOutcome {
                code: DeletionSuccessCode::RoomDeleted,
                disposition: Disposition::Deleted,
                room: None,
            });
        };

        let facts = MeetingFacts {
            has_active_meeting: self.media.room_exists(room_id).await?,
            has_recordings: self.recordings.count_by_room(room_id).await? > 0,
        };

        match resolve(facts, policy) {
            Resolution::Delete {
                code,
                end_meeting,
                purge_recordings,
            } => {
                if end_meeting {
                    self.media.delete_room(room_id).await?;
                }
                if purge_recordings {
                    let purged = self.recordings.delete_by_room(room_id).await?;
                    info!(room_id, purged, "Purged recordings with room");
                }
                self.rooms.delete(room_id).await?;
                info!(room_id, %code, "Room deleted");
                Ok(DeletionOutcome {
                    code,
                    disposition: Disposition::Deleted,
                    room: None,
                })
            }
            Resolution::Close { code, end_meeting } => {
                if end_meeting {
                    self.media.delete_room(room_id).await?;
                }
                room.status = RoomStatus::Closed;
                room.marked_for_deletion = false;
                room.pending_action = None;
                room.updated_at = DateTime::now();
                self.rooms.save(&room).await?;
                info!(room_id, %code, "Room closed, recordings kept");
                Ok(DeletionOutcome {
                    code,
                    disposition: Disposition::Closed,
                    room: Some(room),
                })
            }
            Resolution::Schedule { code, action } => {
                room.marked_for_deletion = true;
                room.pending_action = Some(action);
                room.updated_at = DateTime::now();
                self.rooms.save(&room).await?;
                info!(room_id, %code, ?action, "Room deletion deferred to meeting end");
                Ok(DeletionOutcome {
                    code,
                    disposition: Disposition::Scheduled,
                    room: Some(room),
                })
            }
            Resolution::Reject(code) => Err(LifecycleError::Rejected(code)),
        }
    }

    /// Bulk deletion with per-room isolation: one room's failure never
    /// aborts the others. Ids are sanitized and deduplicated first;
    /// ids that sanitize to nothing are dropped, and a request with no
    /// valid ids at all is rejected before any deletion runs.
    pub async fn delete_many(
        &self,
        raw_room_ids: &[String],
        policy: DeletionPolicy,
    ) -> Result<BulkDeletionReport, LifecycleError> {
        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for raw in raw_room_ids {
            let room_id = sanitize_room_id(raw);
            if room_id.is_empty() {
                warn!(raw, "Dropping invalid room id from bulk deletion");
                continue;
            }
            if seen.insert(room_id.clone()) {
                targets.push(room_id);
            }
        }
        if targets.is_empty() {
            return Err(LifecycleError::EmptyBulkRequest);
        }

        let mut successful = Vec::new();
        let mut failed = Vec::new();
        for room_id in targets {
            match self.delete_sanitized(&room_id, policy).await {
                Ok(outcome) => successful.push(BulkSuccess {
                    room_id,
                    success_code: outcome.code,
                }),
                Err(LifecycleError::Rejected(code)) => failed.push(BulkFailure {
                    room_id,
                    code: Some(code),
                    message: code.as_str().to_string(),
                }),
                Err(e) => {
                    warn!(room_id, error = %e, "Bulk deletion entry failed");
                    failed.push(BulkFailure {
                        room_id,
                        code: None,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(BulkDeletionReport { successful, failed })
    }

    /// Enforce the pending action recorded at scheduling time, once the
    /// media server reports the meeting over.
    pub async fn handle_meeting_ended(
        &self,
        room_id: &str,
    ) -> Result<MeetingEndOutcome, LifecycleError> {
        let Some(mut room) = self.rooms.get(room_id).await? else {
            return Ok(MeetingEndOutcome::RoomGone);
        };

        match room.pending_action {
            Some(PendingAction::DeleteOnMeetingEnd { purge_recordings }) => {
                let purged = if purge_recordings {
                    self.recordings.delete_by_room(room_id).await?
                } else {
                    0
                };
                self.rooms.delete(room_id).await?;
                info!(room_id, purged, "Deferred room deletion executed on meeting end");
                Ok(MeetingEndOutcome::Deleted {
                    purged_recordings: purged,
                })
            }
            Some(PendingAction::CloseOnMeetingEnd) => {
                room.status = RoomStatus::Closed;
                room.marked_for_deletion = false;
                room.pending_action = None;
                room.updated_at = DateTime::now();
                self.rooms.save(&room).await?;
                info!(room_id, "Deferred room close executed on meeting end");
                Ok(MeetingEndOutcome::Closed)
            }
            None => {
                if room.status == RoomStatus::ActiveMeeting {
                    room.status = RoomStatus::Open;
                    room.updated_at = DateTime::now();
                    self.rooms.save(&room).await?;
                }
                Ok(MeetingEndOutcome::Reopened)
            }
        }
    }

    /// Webhook hook for the meeting-started event.
    pub async fn handle_meeting_started(&self, room_id: &str) -> Result<(), LifecycleError> {
        let Some(mut room) = self.rooms.get(room_id).await? else {
            debug!(room_id, "Meeting started for unknown room");
            return Ok(());
        };
        if room.status != RoomStatus::ActiveMeeting {
            room.status = RoomStatus::ActiveMeeting;
            room.updated_at = DateTime::now();
            self.rooms.save(&room).await?;
        }
        Ok(())
    }
}
