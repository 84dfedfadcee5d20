use crate::fixtures::fakes::{FakeLock, FakeMediaServer, InMemoryRecordingStore};
use crate::fixtures::seed::recording;
use bson::DateTime;
use chrono::Utc;
use meethub_db::models::RecordingStatus;
use meethub_services::gc::{RecordingGcConfig, RecordingStaleGc};
use meethub_services::lock::DistributedLock;
use meethub_services::store::RecordingStore;
use std::sync::Arc;
use std::time::Duration;

const GRACE_MS: i64 = 120_000;

struct Harness {
    recordings: Arc<InMemoryRecordingStore>,
    media: Arc<FakeMediaServer>,
    lock: Arc<FakeLock>,
    gc: RecordingStaleGc,
}

fn harness() -> Harness {
    let recordings = Arc::new(InMemoryRecordingStore::default());
    let media = Arc::new(FakeMediaServer::default());
    let lock = Arc::new(FakeLock::default());
    let gc = RecordingStaleGc::new(
        recordings.clone(),
        media.clone(),
        lock.clone(),
        RecordingGcConfig {
            interval: Duration::from_secs(60),
            grace_ms: GRACE_MS,
            lock_ttl: Duration::from_secs(60),
        },
    );
    Harness {
        recordings,
        media,
        lock,
        gc,
    }
}

async fn seed_active(h: &Harness, room_id: &str, egress_id: &str) -> meethub_db::models::RecordingId {
    let rec = recording(room_id, egress_id, RecordingStatus::Active);
    let id = rec.recording_id.clone();
    h.recordings.save(&rec).await.unwrap();
    id
}

#[tokio::test]
async fn heartbeat_exactly_at_the_grace_boundary_is_still_fresh() {
    let h = harness();
    let id = seed_active(&h, "standup", "EG_1").await;
    let now_ms = Utc::now().timestamp_millis();
    h.media.add_egress("standup", "EG_1", now_ms - GRACE_MS);

    let stats = h.gc.sweep_at(now_ms).await.unwrap();

    assert_eq!(stats.examined, 1);
    assert_eq!(stats.fresh, 1);
    assert_eq!(h.recordings.status_of(&id), Some(RecordingStatus::Active));
    assert!(h.media.stopped_egresses().is_empty());
}

#[tokio::test]
async fn heartbeat_one_ms_past_the_boundary_is_stale() {
    let h = harness();
    let id = seed_active(&h, "standup", "EG_1").await;
    let now_ms = Utc::now().timestamp_millis();
    h.media.add_egress("standup", "EG_1", now_ms - GRACE_MS - 1);

    let stats = h.gc.sweep_at(now_ms).await.unwrap();

    assert_eq!(stats.aborted_orphaned, 1);
    assert_eq!(h.recordings.status_of(&id), Some(RecordingStatus::Aborted));
    assert_eq!(h.media.stopped_egresses(), vec!["EG_1".to_string()]);
}

#[tokio::test]
async fn recording_without_matching_egress_is_aborted_without_a_stop_call() {
    let h = harness();
    let id = seed_active(&h, "standup", "EG_GONE").await;

    let stats = h.gc.sweep().await.unwrap();

    assert_eq!(stats.aborted_no_egress, 1);
    assert_eq!(h.recordings.status_of(&id), Some(RecordingStatus::Aborted));
    assert!(h.media.stopped_egresses().is_empty());
}

#[tokio::test]
async fn orphaned_recording_is_stopped_and_aborted() {
    let h = harness();
    let id = seed_active(&h, "standup", "EG_1").await;
    let now_ms = Utc::now().timestamp_millis();
    h.media.add_egress("standup", "EG_1", now_ms - GRACE_MS - 60_000);
    // No meeting on the media server for this room.

    let stats = h.gc.sweep().await.unwrap();

    assert_eq!(stats.aborted_orphaned, 1);
    assert_eq!(h.recordings.status_of(&id), Some(RecordingStatus::Aborted));
    assert_eq!(h.media.stopped_egresses(), vec!["EG_1".to_string()]);
}

#[tokio::test]
async fn stale_recording_in_an_occupied_room_is_kept() {
    let h = harness();
    let id = seed_active(&h, "standup", "EG_1").await;
    let now_ms = Utc::now().timestamp_millis();
    h.media.add_egress("standup", "EG_1", now_ms - GRACE_MS - 60_000);
    h.media.start_meeting("standup", &["alice"]);

    let stats = h.gc.sweep().await.unwrap();

    assert_eq!(stats.kept_stale, 1);
    assert_eq!(h.recordings.status_of(&id), Some(RecordingStatus::Active));
    assert!(h.media.stopped_egresses().is_empty());
}

#[tokio::test]
async fn terminal_recordings_are_never_candidates() {
    let h = harness();
    let rec = recording("standup", "EG_1", RecordingStatus::Complete);
    meethub_services::store::RecordingStore::save(h.recordings.as_ref(), &rec)
        .await
        .unwrap();

    let stats = h.gc.sweep().await.unwrap();

    assert_eq!(stats.examined, 0);
}

#[tokio::test]
async fn sweep_uses_a_future_heartbeat_as_fresh() {
    // Clock skew between this process and the media server must never
    // abort a healthy recording.
    let h = harness();
    let id = seed_active(&h, "standup", "EG_1").await;
    let now_ms = Utc::now().timestamp_millis();
    h.media.add_egress("standup", "EG_1", now_ms + 30_000);

    let stats = h.gc.sweep_at(now_ms).await.unwrap();

    assert_eq!(stats.fresh, 1);
    assert_eq!(h.recordings.status_of(&id), Some(RecordingStatus::Active));
}

#[tokio::test]
async fn denied_lock_skips_the_cycle_entirely() {
    let h = harness();
    let id = seed_active(&h, "standup", "EG_GONE").await;
    h.lock.deny_acquisition();

    let token = h
        .lock
        .acquire("gc:recordings", Duration::from_secs(60))
        .await
        .unwrap();
    assert!(token.is_none());
    assert_eq!(h.recordings.status_of(&id), Some(RecordingStatus::Active));
}
