use bson::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub room_id: String,
    pub room_name: String,
    pub status: RoomStatus,
    pub auto_deletion_date: Option<DateTime>,
    #[serde(default)]
    pub auto_deletion_policy: DeletionPolicy,
    #[serde(default)]
    pub marked_for_deletion: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_action: Option<PendingAction>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    #[default]
    Open,
    ActiveMeeting,
    Closed,
}

/// What to do with an active meeting / existing recordings when the room
/// is asked to go away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeletionPolicy {
    #[serde(default)]
    pub with_meeting: MeetingPolicy,
    #[serde(default)]
    pub with_recordings: RecordingsPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeetingPolicy {
    #[default]
    Fail,
    Force,
    WhenMeetingEnds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordingsPolicy {
    #[default]
    Fail,
    Force,
    Close,
}

/// Deferred deletion decision, enforced once the meeting ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PendingAction {
    DeleteOnMeetingEnd { purge_recordings: bool },
    CloseOnMeetingEnd,
}

impl Room {
    pub const COLLECTION: &'static str = "rooms";

    pub fn has_expired(&self, now: DateTime) -> bool {
        self.auto_deletion_date
            .map(|d| d.timestamp_millis() <= now.timestamp_millis())
            .unwrap_or(false)
    }
}
