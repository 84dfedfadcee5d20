pub mod recording;
pub mod room;

pub use recording::{ParseRecordingIdError, Recording, RecordingId, RecordingStatus};
pub use room::{DeletionPolicy, MeetingPolicy, PendingAction, RecordingsPolicy, Room, RoomStatus};
