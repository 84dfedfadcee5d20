use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bson::DateTime;
use meethub_db::models::{DeletionPolicy, MeetingPolicy, RecordingsPolicy, Room};
use serde::Deserialize;
use validator::Validate;

use crate::{error::ApiError, state::AppState};
use meethub_services::lifecycle::{DeletionSuccessCode, Disposition};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 128))]
    pub room_name: String,
    /// Epoch milliseconds.
    pub auto_deletion_date: Option<i64>,
    #[serde(default)]
    pub with_meeting: MeetingPolicy,
    #[serde(default)]
    pub with_recordings: RecordingsPolicy,
}

#[derive(Debug, Deserialize)]
pub struct PolicyQuery {
    #[serde(default)]
    pub with_meeting: MeetingPolicy,
    #[serde(default)]
    pub with_recordings: RecordingsPolicy,
}

impl PolicyQuery {
    fn policy(&self) -> DeletionPolicy {
        DeletionPolicy {
            with_meeting: self.with_meeting,
            with_recordings: self.with_recordings,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteQuery {
    /// Comma-separated room ids.
    pub room_ids: String,
    #[serde(default)]
    pub with_meeting: MeetingPolicy,
    #[serde(default)]
    pub with_recordings: RecordingsPolicy,
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let policy = DeletionPolicy {
        with_meeting: body.with_meeting,
        with_recordings: body.with_recordings,
    };
    let room = state
        .rooms
        .create(
            &body.room_name,
            policy,
            body.auto_deletion_date.map(DateTime::from_millis),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Room>, ApiError> {
    let room = state
        .rooms
        .get(&room_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Room not found: {room_id}")))?;
    Ok(Json(room))
}

pub async fn delete_one(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(query): Query<PolicyQuery>,
) -> Result<Response, ApiError> {
    let outcome = state
        .orchestrator
        .delete_one(&room_id, query.policy())
        .await?;

    // Plain deletion has nothing to report; deletions with side effects
    // (purged recordings, force-ended meeting) and closes return the
    // outcome, and deferred decisions are 202.
    let response = match outcome.disposition {
        Disposition::Deleted if outcome.code == DeletionSuccessCode::RoomDeleted => {
            StatusCode::NO_CONTENT.into_response()
        }
        Disposition::Deleted | Disposition::Closed => {
            (StatusCode::OK, Json(outcome)).into_response()
        }
        Disposition::Scheduled => (StatusCode::ACCEPTED, Json(outcome)).into_response(),
    };
    Ok(response)
}

pub async fn delete_bulk(
    State(state): State<AppState>,
    Query(query): Query<BulkDeleteQuery>,
) -> Result<Response, ApiError> {
    let room_ids: Vec<String> = query
        .room_ids
        .split(',')
        .map(|s| s.to_string())
        .collect();
    let policy = DeletionPolicy {
        with_meeting: query.with_meeting,
        with_recordings: query.with_recordings,
    };

    let report = state.orchestrator.delete_many(&room_ids, policy).await?;
    let status = if report.all_succeeded() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(report)).into_response())
}
