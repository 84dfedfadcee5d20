use bson::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between the components of a recording id.
const SEP: &str = "--";

/// Composite primary key of a recording: `{room_id}--{egress_id}--{uid}`.
///
/// Parsed strictly before any lookup; malformed ids are rejected up front
/// instead of being split ad hoc at each call site. Room ids may contain
/// single hyphens, so the egress id and uid are taken from the right.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordingId {
    pub room_id: String,
    pub egress_id: String,
    pub uid: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseRecordingIdError {
    #[error("recording id must have three `--` separated components: {0}")]
    MissingComponents(String),
    #[error("recording id has an empty component: {0}")]
    EmptyComponent(String),
    #[error("recording id component contains a separator: {0}")]
    NestedSeparator(String),
}

impl RecordingId {
    pub fn new(
        room_id: impl Into<String>,
        egress_id: impl Into<String>,
        uid: impl Into<String>,
    ) -> Result<Self, ParseRecordingIdError> {
        let id = Self {
            room_id: room_id.into(),
            egress_id: egress_id.into(),
            uid: uid.into(),
        };
        id.validate()?;
        Ok(id)
    }

    fn validate(&self) -> Result<(), ParseRecordingIdError> {
        if self.room_id.is_empty() || self.egress_id.is_empty() || self.uid.is_empty() {
            return Err(ParseRecordingIdError::EmptyComponent(self.to_string()));
        }
        // A `--` inside egress_id or uid would not round-trip.
        if self.egress_id.contains(SEP) || self.uid.contains(SEP) || self.room_id.contains(SEP) {
            return Err(ParseRecordingIdError::NestedSeparator(self.to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEP}{}{SEP}{}", self.room_id, self.egress_id, self.uid)
    }
}

impl FromStr for RecordingId {
    type Err = ParseRecordingIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, SEP);
        let uid = parts.next().unwrap_or_default();
        let egress_id = parts.next().unwrap_or_default();
        let room_id = parts
            .next()
            .ok_or_else(|| ParseRecordingIdError::MissingComponents(s.to_string()))?;
        Self::new(room_id, egress_id, uid)
    }
}

impl TryFrom<String> for RecordingId {
    type Error = ParseRecordingIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RecordingId> for String {
    fn from(id: RecordingId) -> Self {
        id.to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub recording_id: RecordingId,
    /// Denormalized from `recording_id` for room-scoped queries.
    pub room_id: String,
    pub status: RecordingStatus,
    pub started_at: DateTime,
    pub ended_at: Option<DateTime>,
    /// Seconds of recorded media.
    pub duration: u32,
    /// Bytes in the backing media object.
    pub size: u64,
    /// Last egress heartbeat.
    pub updated_at: DateTime,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordingStatus {
    #[default]
    Starting,
    Active,
    Ending,
    Complete,
    Failed,
    Aborted,
    LimitReached,
}

impl RecordingStatus {
    /// Terminal states are the only ones a recording may be deleted in.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Complete | Self::Failed | Self::Aborted | Self::LimitReached
        )
    }

    /// Candidates for the stale-recording sweep.
    pub fn is_active_like(self) -> bool {
        matches!(self, Self::Starting | Self::Active | Self::Ending)
    }
}

impl Recording {
    pub const COLLECTION: &'static str = "recordings";
}
