use async_trait::async_trait;
use bson::DateTime;
use meethub_db::models::{Recording, RecordingId, RecordingStatus, Room};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("BSON serialization error: {0}")]
    BsonSer(#[from] bson::ser::Error),
    #[error("BSON deserialization error: {0}")]
    BsonDe(#[from] bson::de::Error),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable room records, with a cache tier the implementation keeps
/// consistent with the durable one.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn get(&self, room_id: &str) -> StoreResult<Option<Room>>;

    /// Upsert by `room_id`.
    async fn save(&self, room: &Room) -> StoreResult<()>;

    /// Returns whether a record existed. Deleting an absent room is not
    /// an error.
    async fn delete(&self, room_id: &str) -> StoreResult<bool>;

    /// Rooms whose `auto_deletion_date` has passed and which are not yet
    /// marked for deletion.
    async fn list_expired(&self, now: DateTime) -> StoreResult<Vec<Room>>;
}

/// Recording metadata records. The media server owns the recorded
/// media objects themselves.
#[async_trait]
pub trait RecordingStore: Send + Sync {
    async fn get(&self, id: &RecordingId) -> StoreResult<Option<Recording>>;

    async fn save(&self, recording: &Recording) -> StoreResult<()>;

    async fn list_by_room(&self, room_id: &str) -> StoreResult<Vec<Recording>>;

    /// Recordings in an active-like status (Starting/Active/Ending).
    async fn list_active(&self) -> StoreResult<Vec<Recording>>;

    async fn count_by_room(&self, room_id: &str) -> StoreResult<u64>;

    async fn update_status(
        &self,
        id: &RecordingId,
        status: RecordingStatus,
    ) -> StoreResult<bool>;

    /// Update the egress heartbeat and progress counters.
    async fn update_progress(
        &self,
        id: &RecordingId,
        status: RecordingStatus,
        updated_at: DateTime,
        duration: u32,
        size: u64,
    ) -> StoreResult<bool>;

    async fn delete(&self, id: &RecordingId) -> StoreResult<bool>;

    async fn delete_by_room(&self, room_id: &str) -> StoreResult<u64>;
}
