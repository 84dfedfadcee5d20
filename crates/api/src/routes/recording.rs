use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use meethub_db::models::{Recording, RecordingId};
use std::str::FromStr;

use crate::{error::ApiError, state::AppState};

pub async fn list_by_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<Recording>>, ApiError> {
    let room = state
        .rooms
        .get(&room_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Room not found: {room_id}")))?;
    let recordings = state.recording_store.list_by_room(&room.room_id).await?;
    Ok(Json(recordings))
}

pub async fn get(
    State(state): State<AppState>,
    Path(recording_id): Path<String>,
) -> Result<Json<Recording>, ApiError> {
    let id = RecordingId::from_str(&recording_id)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let recording = state
        .recording_store
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Recording not found: {recording_id}")))?;
    Ok(Json(recording))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(recording_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = RecordingId::from_str(&recording_id)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let Some(recording) = state.recording_store.get(&id).await? else {
        // Idempotent, same as room deletion.
        return Ok(StatusCode::NO_CONTENT);
    };
    if !recording.status.is_terminal() {
        return Err(ApiError::Conflict(format!(
            "Recording is still in progress: {recording_id}"
        )));
    }

    state.recording_store.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
