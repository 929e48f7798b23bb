use std::sync::Arc;

use seatwise_core::CoreError;
use seatwise_orch::status::{RequestState, StatusTracker};
use seatwise_store::memory::MemoryStore;
use serde_json::json;


fn tracker() -> StatusTracker {
    StatusTracker::new(Arc::new(MemoryStore::new()))
}

#[tokio::test]
async fn normal_lifecycle_moves_forward() {
    let tracker = tracker();
    tracker.mark_queued("r1").await.unwrap();
    assert_eq!(tracker.get("r1").await.unwrap().status, RequestState::Queued);

    tracker.mark_processing("r1").await.unwrap();
    tracker.mark_completed("r1", json!({"booking_id": "b1"})).await.unwrap();

    let record = tracker.get("r1").await.unwrap();
    assert_eq!(record.status, RequestState::Completed);
    assert_eq!(record.data.unwrap()["booking_id"], "b1");
}

#[tokio::test]
async fn completed_is_terminal() {
    let tracker = tracker();
    tracker.mark_queued("r1").await.unwrap();
    tracker.mark_processing("r1").await.unwrap();
    tracker.mark_completed("r1", json!({})).await.unwrap();

    // A late failure report must not clobber the completed record.
    tracker.mark_failed("r1", "late duplicate").await.unwrap();
    assert_eq!(tracker.get("r1").await.unwrap().status, RequestState::Completed);
    assert!(tracker.is_completed("r1").await.unwrap());
}

#[tokio::test]
async fn failed_request_can_be_reprocessed() {
    let tracker = tracker();
    tracker.mark_queued("r1").await.unwrap();
    tracker.mark_processing("r1").await.unwrap();
    tracker.mark_failed("r1", "payment step down").await.unwrap();

    let record = tracker.get("r1").await.unwrap();
    assert_eq!(record.status, RequestState::Failed);
    assert_eq!(record.error.as_deref(), Some("payment step down"));

    tracker.mark_processing("r1").await.unwrap();
    assert_eq!(tracker.get("r1").await.unwrap().status, RequestState::Processing);
}

#[tokio::test]
async fn queued_cannot_follow_processing() {
    let tracker = tracker();
    tracker.mark_queued("r1").await.unwrap();
    tracker.mark_processing("r1").await.unwrap();

    tracker.mark_queued("r1").await.unwrap();
    assert_eq!(tracker.get("r1").await.unwrap().status, RequestState::Processing);
}

#[tokio::test]
async fn unknown_request_is_not_found() {
    let tracker = tracker();
    let err = tracker.get("missing").await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}
