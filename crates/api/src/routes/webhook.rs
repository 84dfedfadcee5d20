use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};
use bson::DateTime;
use chrono::Utc;
use meethub_db::models::RecordingId;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::{error::ApiError, state::AppState};
use meethub_services::media::webhook::{EgressEventPayload, RoomEventPayload, WebhookEvent};

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {name} header")))
}

/// Media-server event receiver. Signature failures are 401; events for
/// unknown rooms or recordings are acknowledged so the sender does not
/// retry them forever.
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<StatusCode, ApiError> {
    let signature = header_str(&headers, "x-signature")?;
    let timestamp_ms: i64 = header_str(&headers, "x-timestamp")?
        .parse()
        .map_err(|_| ApiError::Unauthorized("Malformed x-timestamp header".to_string()))?;
    state.webhooks.verify(
        &body,
        signature,
        timestamp_ms,
        Utc::now().timestamp_millis(),
    )?;

    let event: WebhookEvent = serde_json::from_str(&body)
        .map_err(|e| ApiError::BadRequest(format!("Malformed webhook body: {e}")))?;

    match event.event_type.as_str() {
        "meeting_started" => {
            let payload: RoomEventPayload = serde_json::from_value(event.data)
                .map_err(|e| ApiError::BadRequest(format!("Malformed event payload: {e}")))?;
            state
                .orchestrator
                .handle_meeting_started(&payload.room_id)
                .await?;
        }
        "meeting_ended" => {
            let payload: RoomEventPayload = serde_json::from_value(event.data)
                .map_err(|e| ApiError::BadRequest(format!("Malformed event payload: {e}")))?;
            let outcome = state
                .orchestrator
                .handle_meeting_ended(&payload.room_id)
                .await?;
            info!(room_id = %payload.room_id, ?outcome, "Meeting ended");
            if let Err(e) = state.names.cleanup_expired(&payload.room_id).await {
                warn!(room_id = %payload.room_id, error = %e, "Reservation cleanup failed");
            }
        }
        "egress_updated" => {
            let payload: EgressEventPayload = serde_json::from_value(event.data)
                .map_err(|e| ApiError::BadRequest(format!("Malformed event payload: {e}")))?;
            let id = RecordingId::from_str(&payload.recording_id)
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            let updated = state
                .recording_store
                .update_progress(
                    &id,
                    payload.status,
                    DateTime::from_millis(payload.updated_at),
                    payload.duration,
                    payload.size,
                )
                .await?;
            if !updated {
                debug!(recording_id = %payload.recording_id, "Egress update for unknown recording");
            }
        }
        other => {
            debug!(event = other, "Ignoring unhandled webhook event");
        }
    }

    Ok(StatusCode::OK)
}
