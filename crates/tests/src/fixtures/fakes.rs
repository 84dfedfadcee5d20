//! In-memory stand-ins for the external capabilities, so lifecycle and
//! sweep behavior can be exercised without MongoDB, Redis, or a media
//! server.

use async_trait::async_trait;
use bson::DateTime;
use dashmap::DashMap;
use meethub_db::models::{Recording, RecordingId, RecordingStatus, Room};
use meethub_services::lock::{DistributedLock, LockResult, LockToken};
use meethub_services::media::{EgressInfo, MediaResult, MediaServer, ParticipantInfo};
use meethub_services::names::{LedgerResult, ReservationLedger};
use meethub_services::store::{RecordingStore, RoomStore, StoreResult};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct InMemoryRoomStore {
    rooms: DashMap<String, Room>,
}

impl InMemoryRoomStore {
    pub fn with(rooms: impl IntoIterator<Item = Room>) -> Self {
        let store = Self::default();
        for room in rooms {
            store.rooms.insert(room.room_id.clone(), room);
        }
        store
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn get(&self, room_id: &str) -> StoreResult<Option<Room>> {
        Ok(self.rooms.get(room_id).map(|r| r.clone()))
    }

    async fn save(&self, room: &Room) -> StoreResult<()> {
        self.rooms.insert(room.room_id.clone(), room.clone());
        Ok(())
    }

    async fn delete(&self, room_id: &str) -> StoreResult<bool> {
        Ok(self.rooms.remove(room_id).is_some())
    }

    async fn list_expired(&self, now: DateTime) -> StoreResult<Vec<Room>> {
        Ok(self
            .rooms
            .iter()
            .filter(|r| !r.marked_for_deletion && r.has_expired(now))
            .map(|r| r.clone())
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryRecordingStore {
    recordings: DashMap<String, Recording>,
}

impl InMemoryRecordingStore {
    pub fn with(recordings: impl IntoIterator<Item = Recording>) -> Self {
        let store = Self::default();
        for recording in recordings {
            store
                .recordings
                .insert(recording.recording_id.to_string(), recording);
        }
        store
    }

    pub fn status_of(&self, id: &RecordingId) -> Option<RecordingStatus> {
        self.recordings.get(&id.to_string()).map(|r| r.status)
    }
}

#[async_trait]
impl RecordingStore for InMemoryRecordingStore {
    async fn get(&self, id: &RecordingId) -> StoreResult<Option<Recording>> {
        Ok(self.recordings.get(&id.to_string()).map(|r| r.clone()))
    }

    async fn save(&self, recording: &Recording) -> StoreResult<()> {
        self.recordings
            .insert(recording.recording_id.to_string(), recording.clone());
        Ok(())
    }

    async fn list_by_room(&self, room_id: &str) -> StoreResult<Vec<Recording>> {
        Ok(self
            .recordings
            .iter()
            .filter(|r| r.room_id == room_id)
            .map(|r| r.clone())
            .collect())
    }

    async fn list_active(&self) -> StoreResult<Vec<Recording>> {
        Ok(self
            .recordings
            .iter()
            .filter(|r| r.status.is_active_like())
            .map(|r| r.clone())
            .collect())
    }

    async fn count_by_room(&self, room_id: &str) -> StoreResult<u64> {
        Ok(self
            .recordings
            .iter()
            .filter(|r| r.room_id == room_id)
            .count() as u64)
    }

    async fn update_status(
        &self,
        id: &RecordingId,
        status: RecordingStatus,
    ) -> StoreResult<bool> {
        match self.recordings.get_mut(&id.to_string()) {
            Some(mut r) => {
                r.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_progress(
        &self,
        id: &RecordingId,
        status: RecordingStatus,
        updated_at: DateTime,
        duration: u32,
        size: u64,
    ) -> StoreResult<bool> {
        match self.recordings.get_mut(&id.to_string()) {
            Some(mut r) => {
                r.status = status;
                r.updated_at = updated_at;
                r.duration = duration;
                r.size = size;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &RecordingId) -> StoreResult<bool> {
        Ok(self.recordings.remove(&id.to_string()).is_some())
    }

    async fn delete_by_room(&self, room_id: &str) -> StoreResult<u64> {
        let doomed: Vec<String> = self
            .recordings
            .iter()
            .filter(|r| r.room_id == room_id)
            .map(|r| r.key().clone())
            .collect();
        for key in &doomed {
            self.recordings.remove(key);
        }
        Ok(doomed.len() as u64)
    }
}

/// Scriptable media-server state, recording every control call made
/// against it.
#[derive(Default)]
pub struct FakeMediaServer {
    live_rooms: DashMap<String, Vec<ParticipantInfo>>,
    egresses: DashMap<String, Vec<EgressInfo>>,
    stopped_egresses: Mutex<Vec<String>>,
    deleted_rooms: Mutex<Vec<String>>,
}

impl FakeMediaServer {
    pub fn start_meeting(&self, room_id: &str, participants: &[&str]) {
        let infos = participants
            .iter()
            .map(|p| ParticipantInfo {
                identity: p.to_string(),
                name: p.to_string(),
            })
            .collect();
        self.live_rooms.insert(room_id.to_string(), infos);
    }

    pub fn add_egress(&self, room_id: &str, egress_id: &str, updated_at_ms: i64) {
        self.egresses
            .entry(room_id.to_string())
            .or_default()
            .push(EgressInfo {
                egress_id: egress_id.to_string(),
                room_id: room_id.to_string(),
                updated_at_ms,
            });
    }

    pub fn stopped_egresses(&self) -> Vec<String> {
        self.stopped_egresses.lock().unwrap().clone()
    }

    pub fn deleted_rooms(&self) -> Vec<String> {
        self.deleted_rooms.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaServer for FakeMediaServer {
    async fn room_exists(&self, room_id: &str) -> MediaResult<bool> {
        Ok(self.live_rooms.contains_key(room_id))
    }

    async fn list_participants(&self, room_id: &str) -> MediaResult<Vec<ParticipantInfo>> {
        Ok(self
            .live_rooms
            .get(room_id)
            .map(|p| p.clone())
            .unwrap_or_default())
    }

    async fn list_egresses(&self, room_id: &str) -> MediaResult<Vec<EgressInfo>> {
        Ok(self
            .egresses
            .get(room_id)
            .map(|e| e.clone())
            .unwrap_or_default())
    }

    async fn stop_egress(&self, egress_id: &str) -> MediaResult<()> {
        self.stopped_egresses
            .lock()
            .unwrap()
            .push(egress_id.to_string());
        for mut entry in self.egresses.iter_mut() {
            entry.retain(|e| e.egress_id != egress_id);
        }
        Ok(())
    }

    async fn delete_room(&self, room_id: &str) -> MediaResult<()> {
        self.deleted_rooms.lock().unwrap().push(room_id.to_string());
        self.live_rooms.remove(room_id);
        self.egresses.remove(room_id);
        Ok(())
    }
}

/// Single-process lock: grants every acquisition unless told to deny,
/// which simulates another instance holding the sweep lock.
#[derive(Default)]
pub struct FakeLock {
    deny: AtomicBool,
}

impl FakeLock {
    pub fn deny_acquisition(&self) {
        self.deny.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DistributedLock for FakeLock {
    async fn acquire(&self, _name: &str, _ttl: Duration) -> LockResult<Option<LockToken>> {
        if self.deny.load(Ordering::SeqCst) {
            Ok(None)
        } else {
            Ok(Some(LockToken::new("test-token")))
        }
    }

    async fn release(&self, _name: &str, _token: &LockToken) -> LockResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryReservationLedger {
    reservations: DashMap<String, i64>,
}

impl InMemoryReservationLedger {
    fn key(room_id: &str, name: &str) -> String {
        format!("{room_id}/{name}")
    }

    pub fn is_reserved(&self, room_id: &str, name: &str) -> bool {
        self.reservations.contains_key(&Self::key(room_id, name))
    }
}

#[async_trait]
impl ReservationLedger for InMemoryReservationLedger {
    async fn try_reserve(
        &self,
        room_id: &str,
        name: &str,
        expires_at_ms: i64,
        now_ms: i64,
    ) -> LedgerResult<bool> {
        let key = Self::key(room_id, name);
        if let Some(existing) = self.reservations.get(&key) {
            if *existing > now_ms {
                return Ok(false);
            }
        }
        self.reservations.insert(key, expires_at_ms);
        Ok(true)
    }

    async fn release(&self, room_id: &str, name: &str) -> LedgerResult<()> {
        self.reservations.remove(&Self::key(room_id, name));
        Ok(())
    }

    async fn cleanup_expired(&self, room_id: &str, now_ms: i64) -> LedgerResult<u64> {
        let prefix = format!("{room_id}/");
        let doomed: Vec<String> = self
            .reservations
            .iter()
            .filter(|e| e.key().starts_with(&prefix) && *e.value() <= now_ms)
            .map(|e| e.key().clone())
            .collect();
        for key in &doomed {
            self.reservations.remove(key);
        }
        Ok(doomed.len() as u64)
    }
}
