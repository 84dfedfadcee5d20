use meethub_db::models::{DeletionPolicy, MeetingPolicy, PendingAction, RecordingsPolicy};

use super::codes::{DeletionErrorCode, DeletionSuccessCode};

/// Facts the caller already established against the media server and the
/// recording store. The resolver itself performs no I/O.
#[derive(Debug, Clone, Copy)]
pub struct MeetingFacts {
    pub has_active_meeting: bool,
    pub has_recordings: bool,
}

/// What the orchestrator must do for one room. `Delete`/`Close` effects
/// execute immediately; `Schedule` records a pending action for the
/// meeting-end hook or the expiry sweep to enforce later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Delete {
        code: DeletionSuccessCode,
        end_meeting: bool,
        purge_recordings: bool,
    },
    Close {
        code: DeletionSuccessCode,
        end_meeting: bool,
    },
    Schedule {
        code: DeletionSuccessCode,
        action: PendingAction,
    },
    Reject(DeletionErrorCode),
}

/// The deletion decision table. Precedence: the meeting fact dominates,
/// then recordings, then the requested policies.
pub fn resolve(facts: MeetingFacts, policy: DeletionPolicy) -> Resolution {
    use DeletionErrorCode as E;
    use DeletionSuccessCode as S;
    use MeetingPolicy as M;
    use RecordingsPolicy as R;

    match (facts.has_active_meeting, facts.has_recordings) {
        (false, false) => Resolution::Delete {
            code: S::RoomDeleted,
            end_meeting: false,
            purge_recordings: false,
        },
        (false, true) => match policy.with_recordings {
            R::Force => Resolution::Delete {
                code: S::RoomAndRecordingsDeleted,
                end_meeting: false,
                purge_recordings: true,
            },
            R::Close => Resolution::Close {
                code: S::RoomClosed,
                end_meeting: false,
            },
            R::Fail => Resolution::Reject(E::RoomHasRecordings),
        },
        (true, false) => match policy.with_meeting {
            M::Force => Resolution::Delete {
                code: S::RoomWithActiveMeetingDeleted,
                end_meeting: true,
                purge_recordings: false,
            },
            M::WhenMeetingEnds => Resolution::Schedule {
                code: S::RoomWithActiveMeetingScheduledToBeDeleted,
                action: PendingAction::DeleteOnMeetingEnd {
                    purge_recordings: false,
                },
            },
            M::Fail => Resolution::Reject(E::RoomHasActiveMeeting),
        },
        (true, true) => match (policy.with_meeting, policy.with_recordings) {
            (M::Force, R::Force) => Resolution::Delete {
                code: S::RoomWithActiveMeetingAndRecordingsDeleted,
                end_meeting: true,
                purge_recordings: true,
            },
            (M::Force, R::Close) => Resolution::Close {
                code: S::RoomWithActiveMeetingClosed,
                end_meeting: true,
            },
            (M::Force, R::Fail) => Resolution::Reject(E::RoomWithActiveMeetingHasRecordings),
            (M::WhenMeetingEnds, R::Force) => Resolution::Schedule {
                code: S::RoomWithActiveMeetingAndRecordingsScheduledToBeDeleted,
                action: PendingAction::DeleteOnMeetingEnd {
                    purge_recordings: true,
                },
            },
            (M::WhenMeetingEnds, R::Close) => Resolution::Schedule {
                code: S::RoomWithActiveMeetingScheduledToBeClosed,
                action: PendingAction::CloseOnMeetingEnd,
            },
            (M::WhenMeetingEnds, R::Fail) => {
                Resolution::Reject(E::RoomWithActiveMeetingHasRecordingsCannotScheduleDeletion)
            }
            (M::Fail, _) => Resolution::Reject(E::RoomWithRecordingsHasActiveMeeting),
        },
    }
}
