use serde::{Deserialize, Serialize};
use std::fmt;

/// Which resolver branch fired for a successful deletion request. Part of
/// the wire contract; the HTTP layer maps these to user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeletionSuccessCode {
    RoomDeleted,
    RoomAndRecordingsDeleted,
    RoomClosed,
    RoomWithActiveMeetingDeleted,
    RoomWithActiveMeetingAndRecordingsDeleted,
    RoomWithActiveMeetingClosed,
    RoomWithActiveMeetingScheduledToBeDeleted,
    RoomWithActiveMeetingScheduledToBeClosed,
    RoomWithActiveMeetingAndRecordingsScheduledToBeDeleted,
}

impl DeletionSuccessCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RoomDeleted => "ROOM_DELETED",
            Self::RoomAndRecordingsDeleted => "ROOM_AND_RECORDINGS_DELETED",
            Self::RoomClosed => "ROOM_CLOSED",
            Self::RoomWithActiveMeetingDeleted => "ROOM_WITH_ACTIVE_MEETING_DELETED",
            Self::RoomWithActiveMeetingAndRecordingsDeleted => {
                "ROOM_WITH_ACTIVE_MEETING_AND_RECORDINGS_DELETED"
            }
            Self::RoomWithActiveMeetingClosed => "ROOM_WITH_ACTIVE_MEETING_CLOSED",
            Self::RoomWithActiveMeetingScheduledToBeDeleted => {
                "ROOM_WITH_ACTIVE_MEETING_SCHEDULED_TO_BE_DELETED"
            }
            Self::RoomWithActiveMeetingScheduledToBeClosed => {
                "ROOM_WITH_ACTIVE_MEETING_SCHEDULED_TO_BE_CLOSED"
            }
            Self::RoomWithActiveMeetingAndRecordingsScheduledToBeDeleted => {
                "ROOM_WITH_ACTIVE_MEETING_AND_RECORDINGS_SCHEDULED_TO_BE_DELETED"
            }
        }
    }
}

impl fmt::Display for DeletionSuccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy rejections; recoverable by retrying with a different policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeletionErrorCode {
    RoomHasActiveMeeting,
    RoomHasRecordings,
    RoomWithActiveMeetingHasRecordings,
    RoomWithRecordingsHasActiveMeeting,
    RoomWithActiveMeetingHasRecordingsCannotScheduleDeletion,
}

impl DeletionErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RoomHasActiveMeeting => "ROOM_HAS_ACTIVE_MEETING",
            Self::RoomHasRecordings => "ROOM_HAS_RECORDINGS",
            Self::RoomWithActiveMeetingHasRecordings => {
                "ROOM_WITH_ACTIVE_MEETING_HAS_RECORDINGS"
            }
            Self::RoomWithRecordingsHasActiveMeeting => {
                "ROOM_WITH_RECORDINGS_HAS_ACTIVE_MEETING"
            }
            Self::RoomWithActiveMeetingHasRecordingsCannotScheduleDeletion => {
                "ROOM_WITH_ACTIVE_MEETING_HAS_RECORDINGS_CANNOT_SCHEDULE_DELETION"
            }
        }
    }
}

impl fmt::Display for DeletionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
