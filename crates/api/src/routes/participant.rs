use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::Validate;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct JoinRequest {
    #[validate(length(min = 1, max = 64))]
    pub participant_name: String,
    #[serde(default)]
    pub can_publish: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    /// The name actually granted, possibly suffixed on conflict.
    pub participant_name: String,
    pub token: String,
}

pub async fn join(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(body): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let room = state
        .rooms
        .get(&room_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Room not found: {room_id}")))?;

    // Reaping stale reservations here keeps the suffix counter from
    // creeping up in long-lived rooms.
    if let Err(e) = state.names.cleanup_expired(&room.room_id).await {
        warn!(room_id = %room.room_id, error = %e, "Reservation cleanup failed");
    }

    let granted = state
        .names
        .reserve(&room.room_id, &body.participant_name)
        .await?;
    let token = state.tokens.issue(
        &room.room_id,
        &granted,
        &granted,
        body.can_publish.unwrap_or(true),
    )?;

    Ok(Json(JoinResponse {
        participant_name: granted,
        token,
    }))
}

pub async fn leave(
    State(state): State<AppState>,
    Path((room_id, participant_name)): Path<(String, String)>,
) -> StatusCode {
    state.names.release(&room_id, &participant_name).await;
    StatusCode::NO_CONTENT
}
