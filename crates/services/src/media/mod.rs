pub mod livekit;
pub mod token;
pub mod webhook;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Media server API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, Clone)]
pub struct ParticipantInfo {
    pub identity: String,
    pub name: String,
}

/// A recording/export process as the media server currently sees it.
#[derive(Debug, Clone)]
pub struct EgressInfo {
    pub egress_id: String,
    pub room_id: String,
    /// Last heartbeat, epoch milliseconds.
    pub updated_at_ms: i64,
}

/// Live room/egress state and control on the media server.
#[async_trait]
pub trait MediaServer: Send + Sync {
    /// A room existing on the media server means a meeting is in
    /// progress there.
    async fn room_exists(&self, room_id: &str) -> MediaResult<bool>;

    /// Empty when the room does not exist.
    async fn list_participants(&self, room_id: &str) -> MediaResult<Vec<ParticipantInfo>>;

    /// In-progress egresses for the room.
    async fn list_egresses(&self, room_id: &str) -> MediaResult<Vec<EgressInfo>>;

    async fn stop_egress(&self, egress_id: &str) -> MediaResult<()>;

    /// Force-disconnects all participants and ends the meeting.
    async fn delete_room(&self, room_id: &str) -> MediaResult<()>;
}
