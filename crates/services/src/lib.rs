pub mod dao;
pub mod gc;
pub mod lifecycle;
pub mod lock;
pub mod media;
pub mod names;
pub mod rooms;
pub mod store;

pub use lifecycle::DeletionOrchestrator;
pub use names::ParticipantNameService;
pub use rooms::RoomService;
