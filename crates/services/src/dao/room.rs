use async_trait::async_trait;
use bson::{DateTime, doc};
use meethub_db::models::Room;
use mongodb::Database;
use tracing::warn;

use crate::store::{RoomStore, StoreResult};

use super::base::BaseDao;
use super::cache::Cache;

/// Room records on MongoDB with a Redis cache tier.
///
/// Writes go to both tiers concurrently; the durable tier decides the
/// outcome. On partial failure the cache entry is dropped so it cannot
/// serve a write that never landed durably, and the TTL bounds any
/// divergence a crash leaves behind.
pub struct MongoRoomStore {
    base: BaseDao<Room>,
    cache: Cache,
}

impl MongoRoomStore {
    pub fn new(db: &Database, cache: Cache) -> Self {
        Self {
            base: BaseDao::new(db, Room::COLLECTION),
            cache,
        }
    }

    fn cache_key(room_id: &str) -> String {
        format!("meethub:room:{room_id}")
    }
}

#[async_trait]
impl RoomStore for MongoRoomStore {
    async fn get(&self, room_id: &str) -> StoreResult<Option<Room>> {
        let key = Self::cache_key(room_id);
        match self.cache.get_json::<Room>(&key).await {
            Ok(Some(room)) => return Ok(Some(room)),
            Ok(None) => {}
            Err(e) => warn!(room_id, error = %e, "Room cache read failed, falling back"),
        }

        let room = self.base.find_one(doc! { "room_id": room_id }).await?;
        if let Some(ref room) = room {
            if let Err(e) = self.cache.set_json(&key, room).await {
                warn!(room_id, error = %e, "Room cache refill failed");
            }
        }
        Ok(room)
    }

    async fn save(&self, room: &Room) -> StoreResult<()> {
        let key = Self::cache_key(&room.room_id);
        let filter = doc! { "room_id": &room.room_id };

        let (durable, cached) = tokio::join!(
            self.base.upsert_one(filter, room),
            self.cache.set_json(&key, room),
        );
        if let Err(e) = &cached {
            warn!(room_id = %room.room_id, error = %e, "Room cache write failed");
        }

        let (outcome, invalidate) = super::settle_dual_write(durable, cached);
        if invalidate {
            if let Err(e) = self.cache.del(&key).await {
                warn!(room_id = %room.room_id, error = %e, "Room cache invalidation failed, TTL will expire it");
            }
        }
        outcome
    }

    async fn delete(&self, room_id: &str) -> StoreResult<bool> {
        let key = Self::cache_key(room_id);

        let (durable, cached) = tokio::join!(
            self.base.delete_one(doc! { "room_id": room_id }),
            self.cache.del(&key),
        );

        // A failed cache delete is survivable: the entry expires on its
        // own TTL. The durable result decides the outcome.
        if let Err(e) = cached {
            warn!(room_id, error = %e, "Room cache delete failed");
        }
        durable
    }

    async fn list_expired(&self, now: DateTime) -> StoreResult<Vec<Room>> {
        self.base
            .find_many(
                doc! {
                    "auto_deletion_date": { "$ne": null, "$lte": now },
                    "marked_for_deletion": false,
                },
                Some(doc! { "auto_deletion_date": 1 }),
            )
            .await
    }
}
