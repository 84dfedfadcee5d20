use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub redis: RedisSettings,
    pub media: MediaSettings,
    pub gc: GcSettings,
    pub webhook: WebhookSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisSettings {
    pub url: String,
    /// TTL for cached room/recording records, in seconds.
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaSettings {
    /// Base URL of the media server HTTP API.
    pub url: String,
    pub api_key: String,
    pub api_secret: String,
    /// Lifetime of issued participant access tokens, in seconds.
    pub access_token_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GcSettings {
    /// Interval between stale-recording sweeps, in seconds.
    pub recording_interval_secs: u64,
    /// Egress heartbeat grace period before a recording is considered
    /// stale, in milliseconds.
    pub recording_grace_ms: i64,
    /// Interval between room-expiry sweeps, in seconds.
    pub room_expiry_interval_secs: u64,
    /// TTL on the sweep locks, in milliseconds.
    pub lock_ttl_ms: u64,
    /// TTL on participant name reservations, in milliseconds.
    pub name_reservation_ttl_ms: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookSettings {
    /// Shared secret for incoming webhook HMAC signatures.
    pub secret: String,
    /// Maximum accepted age of a webhook event, in milliseconds.
    pub max_age_ms: i64,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("MEETHUB"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 4000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "meethub")?
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("redis.cache_ttl_secs", 300)?
            .set_default("media.url", "http://localhost:7880")?
            .set_default("media.api_key", "devkey")?
            .set_default("media.api_secret", "change-me-in-production")?
            .set_default("media.access_token_ttl_secs", 21600)?
            .set_default("gc.recording_interval_secs", 60)?
            .set_default("gc.recording_grace_ms", 120_000)?
            .set_default("gc.room_expiry_interval_secs", 300)?
            .set_default("gc.lock_ttl_ms", 60_000)?
            .set_default("gc.name_reservation_ttl_ms", 300_000)?
            .set_default("webhook.secret", "meethub-webhook-secret")?
            .set_default("webhook.max_age_ms", 120_000)?
            .build()?;

        config.try_deserialize()
    }
}
