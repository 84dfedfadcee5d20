use meethub_config::Settings;
use meethub_services::{
    DeletionOrchestrator, ParticipantNameService, RoomService,
    dao::{Cache, MongoRecordingStore, MongoRoomStore},
    media::{MediaServer, livekit::LiveKitClient, token::AccessTokenIssuer, webhook::WebhookVerifier},
    names::RedisReservationLedger,
    store::{RecordingStore, RoomStore},
};
use mongodb::Database;
use redis::aio::ConnectionManager;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub room_store: Arc<dyn RoomStore>,
    pub recording_store: Arc<dyn RecordingStore>,
    pub media: Arc<dyn MediaServer>,
    pub rooms: Arc<RoomService>,
    pub orchestrator: Arc<DeletionOrchestrator>,
    pub names: Arc<ParticipantNameService>,
    pub tokens: Arc<AccessTokenIssuer>,
    pub webhooks: Arc<WebhookVerifier>,
}

impl AppState {
    pub fn new(db: Database, redis: ConnectionManager, settings: Settings) -> Self {
        let cache = Cache::new(redis.clone(), settings.redis.cache_ttl_secs);
        let room_store: Arc<dyn RoomStore> = Arc::new(MongoRoomStore::new(&db, cache.clone()));
        let recording_store: Arc<dyn RecordingStore> =
            Arc::new(MongoRecordingStore::new(&db, cache));
        let media: Arc<dyn MediaServer> = Arc::new(LiveKitClient::new(settings.media.clone()));

        let rooms = Arc::new(RoomService::new(room_store.clone()));
        let orchestrator = Arc::new(DeletionOrchestrator::new(
            room_store.clone(),
            recording_store.clone(),
            media.clone(),
        ));
        let names = Arc::new(ParticipantNameService::new(
            Arc::new(RedisReservationLedger::new(redis)),
            settings.gc.name_reservation_ttl_ms,
        ));
        let tokens = Arc::new(AccessTokenIssuer::new(settings.media.clone()));
        let webhooks = Arc::new(WebhookVerifier::new(
            settings.webhook.secret.clone(),
            settings.webhook.max_age_ms,
        ));

        Self {
            settings,
            room_store,
            recording_store,
            media,
            rooms,
            orchestrator,
            names,
            tokens,
            webhooks,
        }
    }
}
