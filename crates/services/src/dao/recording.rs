use async_trait::async_trait;
use bson::{DateTime, doc};
use meethub_db::models::{Recording, RecordingId, RecordingStatus};
use mongodb::Database;
use tracing::warn;

use crate::store::{RecordingStore, StoreResult};

use super::base::BaseDao;
use super::cache::Cache;

/// Recording records on MongoDB with a Redis cache tier, keyed by the
/// composite recording id.
pub struct MongoRecordingStore {
    base: BaseDao<Recording>,
    cache: Cache,
}

impl MongoRecordingStore {
    pub fn new(db: &Database, cache: Cache) -> Self {
        Self {
            base: BaseDao::new(db, Recording::COLLECTION),
            cache,
        }
    }

    fn cache_key(id: &RecordingId) -> String {
        format!("meethub:recording:{id}")
    }

    fn status_bson(status: RecordingStatus) -> StoreResult<bson::Bson> {
        Ok(bson::to_bson(&status)?)
    }

    async fn invalidate(&self, id: &RecordingId) {
        if let Err(e) = self.cache.del(&Self::cache_key(id)).await {
            warn!(recording_id = %id, error = %e, "Recording cache invalidation failed");
        }
    }
}

#[async_trait]
impl RecordingStore for MongoRecordingStore {
    async fn get(&self, id: &RecordingId) -> StoreResult<Option<Recording>> {
        let key = Self::cache_key(id);
        match self.cache.get_json::<Recording>(&key).await {
            Ok(Some(recording)) => return Ok(Some(recording)),
            Ok(None) => {}
            Err(e) => warn!(recording_id = %id, error = %e, "Recording cache read failed, falling back"),
        }

        let recording = self
            .base
            .find_one(doc! { "recording_id": id.to_string() })
            .await?;
        if let Some(ref recording) = recording {
            if let Err(e) = self.cache.set_json(&key, recording).await {
                warn!(recording_id = %id, error = %e, "Recording cache refill failed");
            }
        }
        Ok(recording)
    }

    async fn save(&self, recording: &Recording) -> StoreResult<()> {
        let key = Self::cache_key(&recording.recording_id);
        let filter = doc! { "recording_id": recording.recording_id.to_string() };

        let (durable, cached) = tokio::join!(
            self.base.upsert_one(filter, recording),
            self.cache.set_json(&key, recording),
        );
        if let Err(e) = &cached {
            warn!(recording_id = %recording.recording_id, error = %e, "Recording cache write failed");
        }

        let (outcome, invalidate) = super::settle_dual_write(durable, cached);
        if invalidate {
            if let Err(e) = self.cache.del(&key).await {
                warn!(recording_id = %recording.recording_id, error = %e,
                    "Recording cache invalidation failed, TTL will expire it");
            }
        }
        outcome
    }

    async fn list_by_room(&self, room_id: &str) -> StoreResult<Vec<Recording>> {
        self.base
            .find_many(
                doc! { "room_id": room_id },
                Some(doc! { "created_at": -1 }),
            )
            .await
    }

    async fn list_active(&self) -> StoreResult<Vec<Recording>> {
        self.base
            .find_many(
                doc! { "status": { "$in": ["starting", "active", "ending"] } },
                Some(doc! { "updated_at": 1 }),
            )
            .await
    }

    async fn count_by_room(&self, room_id: &str) -> StoreResult<u64> {
        self.base.count(doc! { "room_id": room_id }).await
    }

    async fn update_status(
        &self,
        id: &RecordingId,
        status: RecordingStatus,
    ) -> StoreResult<bool> {
        let modified = self
            .base
            .update_one(
                doc! { "recording_id": id.to_string() },
                doc! { "$set": { "status": Self::status_bson(status)?, "updated_at": DateTime::now() } },
            )
            .await?;
        self.invalidate(id).await;
        Ok(modified)
    }

    async fn update_progress(
        &self,
        id: &RecordingId,
        status: RecordingStatus,
        updated_at: DateTime,
        duration: u32,
        size: u64,
    ) -> StoreResult<bool> {
        let modified = self
            .base
            .update_one(
                doc! { "recording_id": id.to_string() },
                doc! { "$set": {
                    "status": Self::status_bson(status)?,
                    "updated_at": updated_at,
                    "duration": duration,
                    "size": size as i64,
                } },
            )
            .await?;
        self.invalidate(id).await;
        Ok(modified)
    }

    async fn delete(&self, id: &RecordingId) -> StoreResult<bool> {
        let key = Self::cache_key(id);
        let (durable, cached) = tokio::join!(
            self.base.delete_one(doc! { "recording_id": id.to_string() }),
            self.cache.del(&key),
        );

        if let Err(e) = cached {
            warn!(recording_id = %id, error = %e, "Recording cache delete failed");
        }
        durable
    }

    async fn delete_by_room(&self, room_id: &str) -> StoreResult<u64> {
        // Invalidate per-record cache entries before dropping the records.
        let records = self.list_by_room(room_id).await?;
        for record in &records {
            self.invalidate(&record.recording_id).await;
        }
        self.base.delete_many(doc! { "room_id": room_id }).await
    }
}
