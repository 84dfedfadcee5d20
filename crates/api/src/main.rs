use meethub_api::{build_router, state::AppState};
use meethub_config::Settings;
use meethub_db::{connect, indexes::ensure_indexes};
use meethub_services::{
    gc::{RecordingGcConfig, RecordingStaleGc, RoomExpiryGc, RoomExpiryGcConfig},
    lock::RedisLock,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "meethub_api=debug,meethub_services=debug,meethub_db=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let settings = Settings::load()?;
    info!(
        "Starting Meethub API on {}:{}",
        settings.app.host, settings.app.port
    );

    // Connect to MongoDB
    let db = connect(&settings).await?;

    // Ensure indexes
    ensure_indexes(&db).await?;

    // Connect to Redis
    let redis_client = redis::Client::open(settings.redis.url.as_str())?;
    let redis = redis::aio::ConnectionManager::new(redis_client).await?;
    info!("Connected to Redis");

    let app_state = AppState::new(db, redis.clone(), settings.clone());

    // Background sweeps, coordinated across instances by Redis locks
    let cancel = CancellationToken::new();
    let lock = Arc::new(RedisLock::new(redis));

    let recording_gc = Arc::new(RecordingStaleGc::new(
        app_state.recording_store.clone(),
        app_state.media.clone(),
        lock.clone(),
        RecordingGcConfig {
            interval: Duration::from_secs(settings.gc.recording_interval_secs),
            grace_ms: settings.gc.recording_grace_ms,
            lock_ttl: Duration::from_millis(settings.gc.lock_ttl_ms),
        },
    ));
    tokio::spawn(recording_gc.run(cancel.clone()));

    let room_expiry_gc = Arc::new(RoomExpiryGc::new(
        app_state.room_store.clone(),
        app_state.orchestrator.clone(),
        lock,
        RoomExpiryGcConfig {
            interval: Duration::from_secs(settings.gc.room_expiry_interval_secs),
            lock_ttl: Duration::from_millis(settings.gc.lock_ttl_ms),
        },
    ));
    tokio::spawn(room_expiry_gc.run(cancel.clone()));

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
            cancel.cancel();
        })
        .await?;

    Ok(())
}
