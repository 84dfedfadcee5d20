pub mod codes;
pub mod orchestrator;
pub mod resolver;
pub mod sanitize;

pub use codes::{DeletionErrorCode, DeletionSuccessCode};
pub use orchestrator::{
    BulkDeletionReport, BulkFailure, BulkSuccess, DeletionOrchestrator, DeletionOutcome,
    Disposition, LifecycleError, MeetingEndOutcome,
};
pub use resolver::{MeetingFacts, Resolution, resolve};
pub use sanitize::sanitize_room_id;
