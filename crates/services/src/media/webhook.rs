use hmac::{Hmac, Mac};
use meethub_db::models::RecordingStatus;
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Webhook event too old")]
    Expired,
    #[error("Invalid webhook signature")]
    InvalidSignature,
}

/// Validates media-server webhook deliveries: HMAC-SHA256 over
/// `"{timestamp}.{body}"`, hex-encoded in the `x-signature` header, with
/// a bounded event age.
pub struct WebhookVerifier {
    secret: String,
    max_age_ms: i64,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>, max_age_ms: i64) -> Self {
        Self {
            secret: secret.into(),
            max_age_ms,
        }
    }

    pub fn verify(
        &self,
        body: &str,
        signature_hex: &str,
        timestamp_ms: i64,
        now_ms: i64,
    ) -> Result<(), WebhookError> {
        if now_ms - timestamp_ms >= self.max_age_ms {
            return Err(WebhookError::Expired);
        }

        let signature = hex::decode(signature_hex).map_err(|_| WebhookError::InvalidSignature)?;
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(format!("{timestamp_ms}.{body}").as_bytes());
        // verify_slice is constant-time.
        mac.verify_slice(&signature)
            .map_err(|_| WebhookError::InvalidSignature)
    }
}

/// Compute the signature a sender would attach. Used by tests and by
/// outbound delivery.
pub fn sign(secret: &str, timestamp_ms: i64, body: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts any key length"));
    mac.update(format!("{timestamp_ms}.{body}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Envelope of an incoming webhook event. The payload stays raw until
/// the event type is known.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "event")]
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct RoomEventPayload {
    pub room_id: String,
}

#[derive(Debug, Deserialize)]
pub struct EgressEventPayload {
    pub recording_id: String,
    pub status: RecordingStatus,
    /// Egress heartbeat, epoch milliseconds.
    pub updated_at: i64,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub size: u64,
}
