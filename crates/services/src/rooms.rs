use bson::DateTime;
use meethub_db::models::{DeletionPolicy, MeetingPolicy, RecordingsPolicy, Room, RoomStatus};
use nanoid::nanoid;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::lifecycle::sanitize_room_id;
use crate::store::{RoomStore, StoreError};

/// Suffix appended to the name slug so distinct rooms with the same
/// display name get distinct ids.
const ID_SUFFIX_LEN: usize = 6;

const ID_SUFFIX_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
    'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Room name is empty")]
    EmptyName,
    #[error("Room id is empty after sanitization: {0:?}")]
    InvalidRoomId(String),
    #[error("Auto-deletion scheduling is incompatible with a fail policy")]
    UnschedulablePolicy,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Room CRUD on top of the room store.
pub struct RoomService {
    rooms: Arc<dyn RoomStore>,
}

impl RoomService {
    pub fn new(rooms: Arc<dyn RoomStore>) -> Self {
        Self { rooms }
    }

    pub async fn create(
        &self,
        display_name: &str,
        policy: DeletionPolicy,
        auto_deletion_date: Option<DateTime>,
    ) -> Result<Room, RoomError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(RoomError::EmptyName);
        }
        // A FAIL policy means the caller refuses deferral, which an
        // unattended deadline cannot honor.
        if auto_deletion_date.is_some()
            && (policy.with_meeting == MeetingPolicy::Fail
                || policy.with_recordings == RecordingsPolicy::Fail)
        {
            return Err(RoomError::UnschedulablePolicy);
        }

        let now = DateTime::now();
        let room = Room {
            room_id: derive_room_id(display_name),
            room_name: display_name.to_string(),
            status: RoomStatus::Open,
            auto_deletion_date,
            auto_deletion_policy: policy,
            marked_for_deletion: false,
            pending_action: None,
            created_at: now,
            updated_at: now,
        };
        self.rooms.save(&room).await?;
        info!(room_id = %room.room_id, "Room created");
        Ok(room)
    }

    pub async fn get(&self, raw_room_id: &str) -> Result<Option<Room>, RoomError> {
        let room_id = sanitize_room_id(raw_room_id);
        if room_id.is_empty() {
            return Err(RoomError::InvalidRoomId(raw_room_id.to_string()));
        }
        Ok(self.rooms.get(&room_id).await?)
    }
}

/// Deterministic id from the display name plus a uniqueness suffix.
/// Runs of non-id characters collapse to a single hyphen, so the id can
/// never contain the `--` recording-id separator.
pub fn derive_room_id(display_name: &str) -> String {
    let slug = slugify(display_name);
    let suffix = nanoid!(ID_SUFFIX_LEN, &ID_SUFFIX_ALPHABET);
    if slug.is_empty() {
        suffix
    } else {
        format!("{slug}-{suffix}")
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
