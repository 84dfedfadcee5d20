pub mod recording_gc;
pub mod room_expiry;

use thiserror::Error;

use crate::media::MediaError;
use crate::store::StoreError;

/// Failures inside a sweep body. Lock trouble never reaches here: the
/// cycle handles acquisition and release itself.
#[derive(Debug, Error)]
pub enum GcError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Media(#[from] MediaError),
}

pub use recording_gc::{RecordingGcConfig, RecordingStaleGc, RecordingSweepStats};
pub use room_expiry::{RoomExpiryGc, RoomExpiryGcConfig, RoomExpirySweepStats};
