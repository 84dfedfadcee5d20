use crate::fixtures::fakes::{FakeMediaServer, InMemoryRecordingStore, InMemoryRoomStore};
use crate::fixtures::seed::{policy, recording, room};
use meethub_db::models::{
    MeetingPolicy as M, PendingAction, RecordingStatus, RecordingsPolicy as R, Room, RoomStatus,
};
use meethub_services::lifecycle::{
    DeletionErrorCode, DeletionOrchestrator, DeletionSuccessCode, Disposition, LifecycleError,
    MeetingEndOutcome,
};
use meethub_services::store::{RecordingStore, RoomStore};
use std::sync::Arc;

struct Harness {
    rooms: Arc<InMemoryRoomStore>,
    recordings: Arc<InMemoryRecordingStore>,
    media: Arc<FakeMediaServer>,
    orchestrator: DeletionOrchestrator,
}

fn harness(rooms: Vec<Room>) -> Harness {
    let rooms = Arc::new(InMemoryRoomStore::with(rooms));
    let recordings = Arc::new(InMemoryRecordingStore::default());
    let media = Arc::new(FakeMediaServer::default());
    let orchestrator =
        DeletionOrchestrator::new(rooms.clone(), recordings.clone(), media.clone());
    Harness {
        rooms,
        recordings,
        media,
        orchestrator,
    }
}

#[tokio::test]
async fn deleting_a_missing_room_is_idempotent_success() {
    let h = harness(vec![]);

    let outcome = h
        .orchestrator
        .delete_one("no-such-room", policy(M::Fail, R::Fail))
        .await
        .unwrap();

    assert_eq!(outcome.code, DeletionSuccessCode::RoomDeleted);
    assert_eq!(outcome.disposition, Disposition::Deleted);
}

#[tokio::test]
async fn deleting_twice_succeeds_both_times() {
    let h = harness(vec![room("standup")]);

    let first = h
        .orchestrator
        .delete_one("standup", policy(M::Fail, R::Fail))
        .await
        .unwrap();
    let second = h
        .orchestrator
        .delete_one("standup", policy(M::Fail, R::Fail))
        .await
        .unwrap();

    assert_eq!(first.code, DeletionSuccessCode::RoomDeleted);
    assert_eq!(second.code, DeletionSuccessCode::RoomDeleted);
    assert!(!h.rooms.contains("standup"));
}

#[tokio::test]
async fn idle_room_with_recordings_is_rejected_under_fail_policy() {
    let h = harness(vec![room("retro")]);
    h.recordings
        .save(&recording("retro", "EG_1", RecordingStatus::Complete))
        .await
        .unwrap();

    let err = h
        .orchestrator
        .delete_one("retro", policy(M::Fail, R::Fail))
        .await
        .unwrap_err();

    match err {
        LifecycleError::Rejected(code) => {
            assert_eq!(code, DeletionErrorCode::RoomHasRecordings)
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert!(h.rooms.contains("retro"));
}

#[tokio::test]
async fn force_policy_purges_recordings_with_the_room() {
    let h = harness(vec![room("retro")]);
    h.recordings
        .save(&recording("retro", "EG_1", RecordingStatus::Complete))
        .await
        .unwrap();
    h.recordings
        .save(&recording("retro", "EG_2", RecordingStatus::Complete))
        .await
        .unwrap();

    let outcome = h
        .orchestrator
        .delete_one("retro", policy(M::Fail, R::Force))
        .await
        .unwrap();

    assert_eq!(outcome.code, DeletionSuccessCode::RoomAndRecordingsDeleted);
    assert!(!h.rooms.contains("retro"));
    assert_eq!(h.recordings.count_by_room("retro").await.unwrap(), 0);
}

#[tokio::test]
async fn close_policy_keeps_recordings_retrievable() {
    let h = harness(vec![room("retro")]);
    h.recordings
        .save(&recording("retro", "EG_1", RecordingStatus::Complete))
        .await
        .unwrap();

    let outcome = h
        .orchestrator
        .delete_one("retro", policy(M::Fail, R::Close))
        .await
        .unwrap();

    assert_eq!(outcome.code, DeletionSuccessCode::RoomClosed);
    assert_eq!(outcome.disposition, Disposition::Closed);
    let closed = h.rooms.get("retro").await.unwrap().unwrap();
    assert_eq!(closed.status, RoomStatus::Closed);
    assert_eq!(h.recordings.count_by_room("retro").await.unwrap(), 1);
}

#[tokio::test]
async fn force_deleting_a_live_meeting_ends_it_on_the_media_server() {
    let h = harness(vec![room("standup")]);
    h.media.start_meeting("standup", &["alice"]);

    let outcome = h
        .orchestrator
        .delete_one("standup", policy(M::Force, R::Fail))
        .await
        .unwrap();

    assert_eq!(
        outcome.code,
        DeletionSuccessCode::RoomWithActiveMeetingDeleted
    );
    assert_eq!(h.media.deleted_rooms(), vec!["standup".to_string()]);
    assert!(!h.rooms.contains("standup"));
}

#[tokio::test]
async fn scheduled_close_runs_when_the_meeting_ends() {
    let h = harness(vec![room("allhands")]);
    h.media.start_meeting("allhands", &["alice", "bob"]);
    h.recordings
        .save(&recording("allhands", "EG_1", RecordingStatus::Complete))
        .await
        .unwrap();

    let outcome = h
        .orchestrator
        .delete_one("allhands", policy(M::WhenMeetingEnds, R::Close))
        .await
        .unwrap();
    assert_eq!(outcome.disposition, Disposition::Scheduled);
    assert_eq!(
        outcome.code,
        DeletionSuccessCode::RoomWithActiveMeetingScheduledToBeClosed
    );

    // The meeting keeps going; the room is only marked.
    let marked = h.rooms.get("allhands").await.unwrap().unwrap();
    assert!(marked.marked_for_deletion);
    assert_eq!(marked.pending_action, Some(PendingAction::CloseOnMeetingEnd));
    assert!(h.media.deleted_rooms().is_empty());

    let end = h.orchestrator.handle_meeting_ended("allhands").await.unwrap();
    assert_eq!(end, MeetingEndOutcome::Closed);

    let closed = h.rooms.get("allhands").await.unwrap().unwrap();
    assert_eq!(closed.status, RoomStatus::Closed);
    assert!(!closed.marked_for_deletion);
    assert_eq!(h.recordings.count_by_room("allhands").await.unwrap(), 1);
}

#[tokio::test]
async fn scheduled_delete_purges_on_meeting_end() {
    let h = harness(vec![room("allhands")]);
    h.media.start_meeting("allhands", &["alice"]);
    h.recordings
        .save(&recording("allhands", "EG_1", RecordingStatus::Complete))
        .await
        .unwrap();

    h.orchestrator
        .delete_one("allhands", policy(M::WhenMeetingEnds, R::Force))
        .await
        .unwrap();

    let end = h.orchestrator.handle_meeting_ended("allhands").await.unwrap();
    assert_eq!(
        end,
        MeetingEndOutcome::Deleted {
            purged_recordings: 1
        }
    );
    assert!(!h.rooms.contains("allhands"));
}

#[tokio::test]
async fn meeting_end_without_pending_action_reopens_the_room() {
    let mut r = room("standup");
    r.status = RoomStatus::ActiveMeeting;
    let h = harness(vec![r]);

    let end = h.orchestrator.handle_meeting_ended("standup").await.unwrap();
    assert_eq!(end, MeetingEndOutcome::Reopened);
    let reopened = h.rooms.get("standup").await.unwrap().unwrap();
    assert_eq!(reopened.status, RoomStatus::Open);
}

#[tokio::test]
async fn bulk_request_deduplicates_ids() {
    let h = harness(vec![room("standup")]);

    let ids = vec![
        "standup".to_string(),
        "standup".to_string(),
        "standup".to_string(),
    ];
    let report = h
        .orchestrator
        .delete_many(&ids, policy(M::Fail, R::Fail))
        .await
        .unwrap();

    assert!(report.all_succeeded());
    assert_eq!(report.successful.len(), 1);
    assert_eq!(report.successful[0].room_id, "standup");
}

#[tokio::test]
async fn bulk_request_drops_unsanitizable_ids() {
    let h = harness(vec![room("standup")]);

    let ids = vec!["standup".to_string(), "***".to_string()];
    let report = h
        .orchestrator
        .delete_many(&ids, policy(M::Fail, R::Fail))
        .await
        .unwrap();

    assert!(report.all_succeeded());
    assert_eq!(report.successful.len(), 1);
}

#[tokio::test]
async fn bulk_request_with_no_valid_ids_is_rejected_up_front() {
    let h = harness(vec![room("standup")]);

    let ids = vec!["***".to_string(), "   ".to_string()];
    let err = h
        .orchestrator
        .delete_many(&ids, policy(M::Force, R::Force))
        .await
        .unwrap_err();

    assert!(matches!(err, LifecycleError::EmptyBulkRequest));
    assert!(h.rooms.contains("standup"));
}

#[tokio::test]
async fn bulk_failures_do_not_abort_other_rooms() {
    let h = harness(vec![room("a"), room("b"), room("c")]);
    h.media.start_meeting("b", &["alice"]);

    let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let report = h
        .orchestrator
        .delete_many(&ids, policy(M::Fail, R::Fail))
        .await
        .unwrap();

    assert!(!report.all_succeeded());
    assert_eq!(report.successful.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].room_id, "b");
    assert_eq!(
        report.failed[0].code,
        Some(DeletionErrorCode::RoomHasActiveMeeting)
    );
    assert!(!h.rooms.contains("a"));
    assert!(h.rooms.contains("b"));
    assert!(!h.rooms.contains("c"));
}
